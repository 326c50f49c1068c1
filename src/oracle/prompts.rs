//! Prompt builders for each oracle consultation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::Write;

use crate::common::types::{EventSnapshot, HeldPosition, MarketSnapshot, PricePoint};

const BACKGROUND: &str = "\
# Background
You are a trading agent participating in the prediction market Polymarket.
Your goal is to forecast the outcome of future events and make trades that maximize expected value.
Act rationally and probabilistically, not for entertainment.

## How Polymarket works
Each market resolves to YES or NO.
YES and NO are traded as tokens priced between 0.00 and 1.00 USD.
The price reflects the probability the market assigns to the outcome (YES at 0.72 means the market sees a 72% chance).
At resolution the winning token pays 1.00 USD and the losing token pays 0.00 USD.";

fn header(today: NaiveDate) -> String {
    format!("{}\n\n# Today\n{}\n", BACKGROUND, today.format("%Y-%m-%d"))
}

/// Human-readable block describing one market
pub fn describe_market(market: &MarketSnapshot) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "market_id: {}", market.market_id);
    let _ = writeln!(text, "question: {}", market.question);
    if let Some(end) = &market.end_date {
        let _ = writeln!(text, "end date: {}", end);
    }
    for quote in &market.outcomes {
        let _ = writeln!(text, "{} token price: {}", quote.token_name, quote.price);
    }
    if let Some(description) = &market.description {
        let _ = writeln!(text, "rules: {}", description.trim());
    }
    text
}

fn describe_event(event: &EventSnapshot) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "event_id: {}", event.event_id);
    let _ = writeln!(text, "title: {}", event.title);
    if let Some(volume) = event.volume {
        let _ = writeln!(text, "volume: {}", volume);
    }
    if let Some(liquidity) = event.liquidity {
        let _ = writeln!(text, "liquidity: {}", liquidity);
    }
    if let Some(description) = &event.description {
        let _ = writeln!(text, "description: {}", description.trim());
    }
    text
}

/// One-paragraph summary of a token's price history
pub fn summarize_history(token_name: &str, points: &[PricePoint]) -> String {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return format!("{} token: no price history available.", token_name),
    };
    let min = points.iter().map(|p| p.price).min().unwrap_or(Decimal::ZERO);
    let max = points.iter().map(|p| p.price).max().unwrap_or(Decimal::ZERO);

    format!(
        "{} token: {} points from {} to {}; first {}, last {}, low {}, high {}.",
        token_name,
        points.len(),
        first.timestamp.format("%Y-%m-%d %H:%M"),
        last.timestamp.format("%Y-%m-%d %H:%M"),
        first.price,
        last.price,
        min,
        max
    )
}

/// Ask the oracle to pick one event from a listing
pub fn select_event(today: NaiveDate, events: &[EventSnapshot]) -> String {
    let listing: Vec<String> = events.iter().map(describe_event).collect();
    format!(
        "{}
# Task
The following events are currently open.
Choose the one event you most want to trade and call show_event_detail with its event_id.
The event_id must be one of the listed ids.

# Events
{}",
        header(today),
        listing.join("\n")
    )
}

/// Ask the oracle to pick one market from a listing
pub fn select_market(today: NaiveDate, markets: &[MarketSnapshot]) -> String {
    let listing: Vec<String> = markets.iter().map(describe_market).collect();
    format!(
        "{}
# Task
The following markets are currently open.
Choose the one market you want to trade, or whose outcome you are most confident about, and call show_market_detail with its market_id.
Favour markets where the price looks mispriced relative to the general consensus.
The market_id must be one of the listed ids.

# Markets
{}",
        header(today),
        listing.join("\n")
    )
}

/// Ask for a researched opinion without a trade
pub fn opinion(today: NaiveDate, market: &MarketSnapshot, history: &str) -> String {
    format!(
        "{}
# Task
You are about to trade the market below.
Give your view of the likely outcome using its rules, prices and price history.
Look up related news if any exists.
Only state your research and opinion here; do not decide which token or how many to buy.

# Market
{}
# Price history
{}
",
        header(today),
        describe_market(market),
        history
    )
}

/// Ask for the token and quantity to buy
pub fn place_order(
    today: NaiveDate,
    market: &MarketSnapshot,
    history: &str,
    opinion: Option<&str>,
    min_tokens: u32,
    max_tokens: u32,
) -> String {
    let tokens = market.token_names().join("' or '");
    format!(
        "{}
# Task
You are about to trade the market below.
Decide which token to buy and how many, then call make_order.
token: answer '{}', exactly as written.
size: an integer from {} to {}. Go near {} when confident and near {} when not.

# Market
{}
# Price history
{}

# Expert opinion
{}
",
        header(today),
        tokens,
        min_tokens,
        max_tokens,
        max_tokens,
        min_tokens,
        describe_market(market),
        history,
        opinion.unwrap_or("none")
    )
}

/// Ask whether to keep or exit a held position
pub fn hold_or_sell(
    today: NaiveDate,
    market: &MarketSnapshot,
    position: &HeldPosition,
    history: &str,
    sell_keyword: &str,
) -> String {
    let status = if position.is_at_loss() {
        "Your token is currently at a loss. Considering today's date, the market end date and whether the token is likely to gain value, decide whether to hold or sell it."
    } else {
        "Your token is currently in profit. Considering today's date, the market end date and the risk that the final forecast turns out wrong, decide whether to hold or sell it."
    };

    format!(
        "{}
# Task
Below are the details of a market you traded earlier and of the token you hold.
{}
When in doubt, hold.
Answer with a single word: 'hold' or '{}'.

# Market
{}
# Price history
{}

# Your position
token: {}
size: {}
average price: {}
current price: {}
cost basis: {}
current value: {}
unrealized P&L: {}
",
        header(today),
        status,
        sell_keyword,
        describe_market(market),
        history,
        position.token_name,
        position.size,
        position.avg_price,
        position.current_price,
        position.cost_basis(),
        position.current_value(),
        position.delta
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::TokenQuote;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn market() -> MarketSnapshot {
        MarketSnapshot {
            market_id: "516710".to_string(),
            condition_id: "0xabc".to_string(),
            question: "Will it rain tomorrow?".to_string(),
            description: Some("Resolves YES if it rains.".to_string()),
            end_date: Some("2026-12-31".to_string()),
            outcomes: vec![
                TokenQuote {
                    token_name: "Yes".to_string(),
                    token_id: "1".to_string(),
                    price: dec!(0.5),
                },
                TokenQuote {
                    token_name: "No".to_string(),
                    token_id: "2".to_string(),
                    price: dec!(0.5),
                },
            ],
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_order_prompt_carries_bounds_and_tokens() {
        let prompt = place_order(today(), &market(), "n/a", None, 5, 8);
        assert!(prompt.contains("2026-10-19"));
        assert!(prompt.contains("'Yes' or 'No'"));
        assert!(prompt.contains("an integer from 5 to 8"));
        assert!(prompt.contains("# Expert opinion\nnone"));
    }

    #[test]
    fn test_hold_prompt_frames_loss() {
        let position = HeldPosition {
            condition_id: "0xabc".to_string(),
            token_name: "Yes".to_string(),
            token_id: "1".to_string(),
            size: dec!(10),
            avg_price: dec!(0.5),
            current_price: dec!(0.4),
            delta: dec!(-1),
            title: None,
        };
        let prompt = hold_or_sell(today(), &market(), &position, "n/a", "sell");
        assert!(prompt.contains("at a loss"));
        assert!(prompt.contains("cost basis: 5.0\ncurrent value: 4.0"));
        assert!(prompt.contains("When in doubt, hold."));
        assert!(prompt.contains("'hold' or 'sell'"));
    }

    #[test]
    fn test_history_summary() {
        let points = vec![
            PricePoint {
                timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                price: dec!(0.40),
            },
            PricePoint {
                timestamp: Utc.timestamp_opt(1_700_003_600, 0).unwrap(),
                price: dec!(0.55),
            },
            PricePoint {
                timestamp: Utc.timestamp_opt(1_700_007_200, 0).unwrap(),
                price: dec!(0.50),
            },
        ];
        let summary = summarize_history("Yes", &points);
        assert!(summary.contains("3 points"));
        assert!(summary.contains("first 0.40, last 0.50, low 0.40, high 0.55"));

        assert_eq!(
            summarize_history("No", &[]),
            "No token: no price history available."
        );
    }
}
