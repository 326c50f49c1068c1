//! EIP-712 signing for CLOB orders and L1 (ClobAuth) authentication

use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256};
use ethers::utils::keccak256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::messages::SignedOrderPayload;
use crate::common::errors::{AgentError, Result};
use crate::common::types::{OrderDecision, Side};

const CLOB_DOMAIN_NAME: &str = "ClobAuthDomain";
const CLOB_VERSION: &str = "1";
const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

const EXCHANGE_DOMAIN_NAME: &str = "Polymarket CTF Exchange";
/// CTF Exchange contract on Polygon
const EXCHANGE_ADDRESS: &str = "0x4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E";
const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// USDC and outcome tokens both use six decimals
const AMOUNT_SCALE: u64 = 1_000_000;

/// Wallet-backed signer for order and ClobAuth payloads
#[derive(Clone)]
pub struct OrderSigner {
    wallet: LocalWallet,
    chain_id: u64,
    /// Account that holds the funds (proxy wallet); defaults to the signer
    funder: Address,
    signature_type: u8,
}

impl std::fmt::Debug for OrderSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderSigner")
            .field("address", &self.wallet.address())
            .field("funder", &self.funder)
            .field("chain_id", &self.chain_id)
            .field("signature_type", &self.signature_type)
            .finish()
    }
}

impl OrderSigner {
    /// Create a signer from a private key (hex string, with or without 0x prefix)
    pub fn from_private_key(
        private_key: &str,
        chain_id: u64,
        funder: Option<&str>,
        signature_type: u8,
    ) -> Result<Self> {
        let key_hex = private_key.trim().trim_start_matches("0x");
        let wallet: LocalWallet = key_hex
            .parse()
            .map_err(|e| AgentError::Authentication(format!("Invalid private key: {}", e)))?;
        let wallet = wallet.with_chain_id(chain_id);

        let funder = match funder {
            Some(addr) => parse_address(addr)?,
            None => wallet.address(),
        };

        Ok(Self {
            wallet,
            chain_id,
            funder,
            signature_type,
        })
    }

    /// The signer's address as a 0x-prefixed hex string
    pub fn address_hex(&self) -> String {
        format!("{:?}", self.wallet.address())
    }

    fn sign_digest(&self, digest: [u8; 32]) -> Result<String> {
        let signature = self
            .wallet
            .sign_hash(H256::from(digest))
            .map_err(|e| AgentError::Authentication(format!("Signing failed: {}", e)))?;
        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }

    /// Sign the ClobAuth message used to derive L2 API credentials
    pub fn sign_clob_auth(&self, timestamp: i64, nonce: u64) -> Result<String> {
        let mut domain = Vec::with_capacity(128);
        domain.extend_from_slice(&keccak256(
            b"EIP712Domain(string name,string version,uint256 chainId)",
        ));
        domain.extend_from_slice(&keccak256(CLOB_DOMAIN_NAME.as_bytes()));
        domain.extend_from_slice(&keccak256(CLOB_VERSION.as_bytes()));
        domain.extend_from_slice(&u256_to_bytes32(U256::from(self.chain_id)));
        let domain_separator = keccak256(&domain);

        let mut data = Vec::with_capacity(160);
        data.extend_from_slice(&keccak256(
            b"ClobAuth(address address,string timestamp,uint256 nonce,string message)",
        ));
        data.extend_from_slice(&address_to_bytes32(self.wallet.address()));
        data.extend_from_slice(&keccak256(timestamp.to_string().as_bytes()));
        data.extend_from_slice(&u256_to_bytes32(U256::from(nonce)));
        data.extend_from_slice(&keccak256(CLOB_AUTH_MESSAGE.as_bytes()));
        let struct_hash = keccak256(&data);

        self.sign_digest(typed_data_digest(&domain_separator, &struct_hash))
    }

    /// Build and sign a GTC limit order for a sized decision
    pub fn sign_order(&self, decision: &OrderDecision, salt: u64) -> Result<SignedOrderPayload> {
        let token_id = U256::from_dec_str(&decision.token_id).map_err(|e| {
            AgentError::ExchangeError(format!("Invalid token id {}: {}", decision.token_id, e))
        })?;
        let (maker_amount, taker_amount) =
            order_amounts(decision.side, decision.price, decision.size)?;
        let taker = parse_address(ZERO_ADDRESS)?;
        let side: u8 = match decision.side {
            Side::Buy => 0,
            Side::Sell => 1,
        };

        let mut data = Vec::with_capacity(13 * 32);
        data.extend_from_slice(&keccak256(
            b"Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)",
        ));
        data.extend_from_slice(&u256_to_bytes32(U256::from(salt)));
        data.extend_from_slice(&address_to_bytes32(self.funder));
        data.extend_from_slice(&address_to_bytes32(self.wallet.address()));
        data.extend_from_slice(&address_to_bytes32(taker));
        data.extend_from_slice(&u256_to_bytes32(token_id));
        data.extend_from_slice(&u256_to_bytes32(U256::from(maker_amount)));
        data.extend_from_slice(&u256_to_bytes32(U256::from(taker_amount)));
        data.extend_from_slice(&u256_to_bytes32(U256::zero())); // expiration
        data.extend_from_slice(&u256_to_bytes32(U256::zero())); // nonce
        data.extend_from_slice(&u256_to_bytes32(U256::zero())); // feeRateBps
        data.extend_from_slice(&u256_to_bytes32(U256::from(side)));
        data.extend_from_slice(&u256_to_bytes32(U256::from(self.signature_type)));
        let struct_hash = keccak256(&data);

        let signature =
            self.sign_digest(typed_data_digest(&self.exchange_domain_separator()?, &struct_hash))?;

        Ok(SignedOrderPayload {
            salt,
            maker: format!("{:?}", self.funder),
            signer: self.address_hex(),
            taker: ZERO_ADDRESS.to_string(),
            token_id: decision.token_id.clone(),
            maker_amount: maker_amount.to_string(),
            taker_amount: taker_amount.to_string(),
            expiration: "0".to_string(),
            nonce: "0".to_string(),
            fee_rate_bps: "0".to_string(),
            side: decision.side.to_string(),
            signature_type: self.signature_type,
            signature,
        })
    }

    fn exchange_domain_separator(&self) -> Result<[u8; 32]> {
        let mut data = Vec::with_capacity(160);
        data.extend_from_slice(&keccak256(
            b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        ));
        data.extend_from_slice(&keccak256(EXCHANGE_DOMAIN_NAME.as_bytes()));
        data.extend_from_slice(&keccak256(b"1"));
        data.extend_from_slice(&u256_to_bytes32(U256::from(self.chain_id)));
        data.extend_from_slice(&address_to_bytes32(parse_address(EXCHANGE_ADDRESS)?));
        Ok(keccak256(&data))
    }
}

/// Maker and taker amounts in six-decimal base units
///
/// A buy pays `price * size` USDC for `size` tokens; a sell pays `size`
/// tokens for `price * size` USDC.
pub fn order_amounts(side: Side, price: Decimal, size: Decimal) -> Result<(u128, u128)> {
    let notional = to_base_units(price * size)?;
    let quantity = to_base_units(size)?;
    Ok(match side {
        Side::Buy => (notional, quantity),
        Side::Sell => (quantity, notional),
    })
}

fn to_base_units(amount: Decimal) -> Result<u128> {
    (amount * Decimal::from(AMOUNT_SCALE))
        .trunc()
        .to_u128()
        .ok_or_else(|| AgentError::ExchangeError(format!("Amount out of range: {}", amount)))
}

fn typed_data_digest(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> [u8; 32] {
    let mut data = Vec::with_capacity(66);
    data.extend_from_slice(&[0x19, 0x01]);
    data.extend_from_slice(domain_separator);
    data.extend_from_slice(struct_hash);
    keccak256(&data)
}

fn parse_address(addr: &str) -> Result<Address> {
    addr.trim()
        .parse()
        .map_err(|e| AgentError::Authentication(format!("Invalid address {}: {}", addr, e)))
}

fn u256_to_bytes32(value: U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

fn address_to_bytes32(addr: Address) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[12..].copy_from_slice(addr.as_bytes());
    bytes
}
