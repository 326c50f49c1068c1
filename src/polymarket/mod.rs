//! Polymarket module - Gamma, Data API and CLOB clients

pub mod auth;
pub mod client;
pub mod gateway;
pub mod messages;
pub mod rest;
pub mod signer;

pub use client::PolymarketClient;
pub use gateway::{ClobOrderGateway, DryRunGateway};
