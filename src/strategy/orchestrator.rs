//! Sequences one trading cycle at a time and journals every cycle
//!
//! ```text
//! buy:  COLLECT_CONTEXT -> LLM_CONSULT -> SIZE_ORDER -> SUBMIT -> SUCCESS | FAILED
//! sell: COLLECT_CONTEXT -> RULE_CHECK -> [LLM_CONSULT] -> SIZE_ORDER -> SUBMIT -> SUCCESS | FAILED
//!                                     \-> HOLD
//! ```
//!
//! Collaborator calls are awaited one after another; at most one order is in
//! flight and a failed submission is never retried.

use chrono::Utc;
use rand::seq::IndexedRandom;
use serde_json::json;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::common::errors::{AgentError, Result};
use crate::common::traits::{
    BoxedAuditSink, BoxedDecisionOracle, BoxedMarketDataProvider, BoxedOrderGateway, EventFilter,
};
use crate::common::types::{EventSnapshot, HeldPosition, MarketSnapshot, OrderDecision};
use crate::config::types::TradingConfig;
use crate::oracle::messages::{DecisionKind, OracleReply, OracleRequest, ToolCall};
use crate::oracle::prompts;
use crate::polymarket::messages::{GammaEvent, PositionRecord};
use crate::strategy::escalation::EscalationFilter;
use crate::strategy::market_normalizer::MarketNormalizer;
use crate::strategy::position_normalizer::normalize_position;
use crate::strategy::size_calculator::OrderSizer;
use crate::strategy::types::{CycleKind, CycleRecord, CycleStage, Verdict};

/// Drives buy and sell cycles against the injected collaborators
pub struct DecisionOrchestrator {
    provider: BoxedMarketDataProvider,
    oracle: BoxedDecisionOracle,
    gateway: BoxedOrderGateway,
    audit: BoxedAuditSink,
    config: TradingConfig,
    normalizer: MarketNormalizer,
    filter: EscalationFilter,
    sizer: OrderSizer,
}

impl DecisionOrchestrator {
    pub fn new(
        provider: BoxedMarketDataProvider,
        oracle: BoxedDecisionOracle,
        gateway: BoxedOrderGateway,
        audit: BoxedAuditSink,
        config: TradingConfig,
    ) -> Self {
        Self {
            normalizer: MarketNormalizer::new(config.max_higher_price),
            filter: EscalationFilter::new(config.rules.clone()),
            sizer: OrderSizer::new(&config),
            provider,
            oracle,
            gateway,
            audit,
            config,
        }
    }

    /// Sell batch over every held position, then one buy cycle
    pub async fn run(&self, account: &str, tag: Option<String>, via_event: bool) -> Vec<CycleRecord> {
        let mut records = match self.run_sell_batch(account).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Sell batch skipped: {}", e);
                Vec::new()
            }
        };
        records.push(self.run_buy_cycle(tag, via_event).await);
        records
    }

    // ========================================================================
    // Buy
    // ========================================================================

    /// One buy cycle; `tag` defaults to a random configured tag
    #[instrument(skip(self))]
    pub async fn run_buy_cycle(&self, tag: Option<String>, via_event: bool) -> CycleRecord {
        let tag = tag.or_else(|| self.config.event_tags.choose(&mut rand::rng()).cloned());
        let mut record = CycleRecord::new(CycleKind::Buy, tag.clone().unwrap_or_else(|| "all".to_string()));

        match self.buy(&mut record, tag, via_event).await {
            Ok(Some(decision)) => self.submit(&mut record, decision).await,
            Ok(None) => {}
            Err(e) => {
                warn!(kind = e.kind(), "Buy cycle failed: {}", e);
                record.fail(&e, None);
            }
        }
        self.finish(record)
    }

    /// Everything up to SIZE_ORDER; `None` when the cycle ended in HOLD
    async fn buy(
        &self,
        record: &mut CycleRecord,
        tag: Option<String>,
        via_event: bool,
    ) -> Result<Option<OrderDecision>> {
        let today = Utc::now().date_naive();

        // COLLECT_CONTEXT
        let filter = EventFilter::new(tag, self.config.event_limit, self.config.volume_min);
        let mut events = self.provider.fetch_events(&filter).await?;
        let mut candidates = self.normalizer.candidates(&events);
        let mut untagged = false;
        if candidates.is_empty() && filter.tag_slug.is_some() {
            info!("No candidates for tag {:?}, retrying without a tag", filter.tag_slug);
            events = self.provider.fetch_events(&filter.untagged()).await?;
            candidates = self.normalizer.candidates(&events);
            untagged = true;
        }
        record.enter(
            CycleStage::CollectContext,
            json!({
                "tag": filter.tag_slug,
                "untagged_fallback": untagged,
                "events": events.len(),
                "candidates": candidates.iter().map(|m| &m.market_id).collect::<Vec<_>>(),
            }),
        );
        if candidates.is_empty() {
            info!("No candidate markets");
            record.hold("no candidate markets");
            return Ok(None);
        }

        // LLM_CONSULT
        if via_event {
            candidates = self.choose_event(record, today, &events).await?;
        }
        let market_id = self.choose_market(record, today, &candidates).await?;
        record.subject = market_id.clone();

        let market = self.normalizer.normalize(&self.provider.fetch_market(&market_id).await?)?;
        let history = self.history_text(&market, None).await;
        record.enter(
            CycleStage::LlmConsult,
            json!({"step": "market_detail", "market": market, "history": history}),
        );

        let opinion = if self.config.consult_opinion {
            let request = OracleRequest::new(
                DecisionKind::Opinion,
                prompts::opinion(today, &market, &history),
            );
            Some(self.consult(record, "opinion", request).await?.into_text()?)
        } else {
            None
        };

        let request = OracleRequest::new(
            DecisionKind::PlaceOrder,
            prompts::place_order(
                today,
                &market,
                &history,
                opinion.as_deref(),
                self.config.min_buy_tokens,
                self.config.max_buy_tokens,
            ),
        );
        let (token, size) = match self.consult(record, "order", request).await?.into_tool_call()? {
            ToolCall::MakeOrder { token, size } => (token, size),
            other => return Err(unexpected_call(&other)),
        };

        // SIZE_ORDER
        let decision = self.sizer.size_buy(&market, &token, &size)?;
        record.enter(CycleStage::SizeOrder, json!(decision));
        Ok(Some(decision))
    }

    /// Let the oracle pick an event and return that event's candidates
    async fn choose_event(
        &self,
        record: &mut CycleRecord,
        today: chrono::NaiveDate,
        events: &[GammaEvent],
    ) -> Result<Vec<MarketSnapshot>> {
        let listed: Vec<EventSnapshot> = events
            .iter()
            .map(|e| self.normalizer.normalize_event(e))
            .filter(|e| !self.normalizer.event_candidates(e).is_empty())
            .collect();

        let request = OracleRequest::new(DecisionKind::SelectEvent, prompts::select_event(today, &listed));
        let event_id = match self.consult(record, "select_event", request).await?.into_tool_call()? {
            ToolCall::ShowEventDetail { event_id } => event_id,
            other => return Err(unexpected_call(&other)),
        };

        let event = listed
            .iter()
            .find(|e| e.event_id == event_id)
            .ok_or_else(|| AgentError::UnknownEvent(event_id.clone()))?;
        info!(event_id = %event.event_id, title = %event.title, "Event selected");
        Ok(self.normalizer.event_candidates(event))
    }

    async fn choose_market(
        &self,
        record: &mut CycleRecord,
        today: chrono::NaiveDate,
        candidates: &[MarketSnapshot],
    ) -> Result<String> {
        let request = OracleRequest::new(DecisionKind::SelectMarket, prompts::select_market(today, candidates));
        let market_id = match self.consult(record, "select_market", request).await?.into_tool_call()? {
            ToolCall::ShowMarketDetail { market_id } => market_id,
            other => return Err(unexpected_call(&other)),
        };

        if !candidates.iter().any(|m| m.market_id == market_id) {
            return Err(AgentError::UnknownMarket(market_id));
        }
        info!(%market_id, "Market selected");
        Ok(market_id)
    }

    // ========================================================================
    // Sell
    // ========================================================================

    /// One sell cycle per held position, in reported order
    ///
    /// Only the position listing itself can fail the batch; every per-position
    /// failure is recorded and the batch moves on. Rows with no size left are
    /// skipped without a cycle.
    #[instrument(skip(self))]
    pub async fn run_sell_batch(&self, account: &str) -> Result<Vec<CycleRecord>> {
        let positions = self.provider.fetch_positions(account).await?;
        let (held, empty): (Vec<_>, Vec<_>) = positions
            .into_iter()
            .partition(|p| p.size > Decimal::ZERO);
        if !empty.is_empty() {
            debug!("Skipping {} empty positions", empty.len());
        }
        info!("Reviewing {} positions", held.len());

        let mut records = Vec::with_capacity(held.len());
        for raw in &held {
            records.push(self.run_sell_cycle(raw).await);
        }
        Ok(records)
    }

    #[instrument(skip(self, raw), fields(condition_id = %raw.condition_id, asset = %raw.asset))]
    pub async fn run_sell_cycle(&self, raw: &PositionRecord) -> CycleRecord {
        let mut record = CycleRecord::new(CycleKind::Sell, raw.condition_id.clone());

        match self.sell(&mut record, raw).await {
            Ok(Some(decision)) => self.submit(&mut record, decision).await,
            Ok(None) => {}
            Err(e) => {
                warn!(kind = e.kind(), "Sell cycle failed: {}", e);
                record.fail(&e, None);
            }
        }
        self.finish(record)
    }

    async fn sell(&self, record: &mut CycleRecord, raw: &PositionRecord) -> Result<Option<OrderDecision>> {
        // COLLECT_CONTEXT
        let position = normalize_position(raw)?;
        let market = self.market_for(&position).await?;
        record.enter(
            CycleStage::CollectContext,
            json!({"position": position, "market": market}),
        );

        // RULE_CHECK
        let verdict = self.filter.evaluate(&position);
        info!(
            escalate = verdict.is_escalate(),
            reason = verdict.reason(),
            "Rule check"
        );
        record.enter(CycleStage::RuleCheck, json!(verdict));

        match verdict {
            Verdict::Hold(reason) => {
                record.hold(reason);
                return Ok(None);
            }
            Verdict::Sell(_) => {}
            Verdict::Escalate(_) => {
                // LLM_CONSULT
                let today = Utc::now().date_naive();
                let history = self.history_text(&market, Some(&position.token_id)).await;
                let request = OracleRequest::new(
                    DecisionKind::HoldOrSell,
                    prompts::hold_or_sell(today, &market, &position, &history, &self.config.sell_keyword),
                );
                let answer = self.consult(record, "hold_or_sell", request).await?.into_text()?;

                if !self.says_sell(&answer) {
                    record.hold(format!("oracle chose to hold: {}", answer.trim()));
                    return Ok(None);
                }
            }
        }

        // SIZE_ORDER
        let decision = self.sizer.size_sell(&market, &position)?;
        record.enter(CycleStage::SizeOrder, json!(decision));
        Ok(Some(decision))
    }

    /// Fresh market quotes for a held position
    async fn market_for(&self, position: &HeldPosition) -> Result<MarketSnapshot> {
        let markets = self
            .provider
            .fetch_markets_by_condition(&position.condition_id)
            .await?;
        let raw = markets
            .iter()
            .find(|m| m.condition_id.as_deref() == Some(position.condition_id.as_str()))
            .ok_or_else(|| {
                AgentError::MalformedMarketData(format!(
                    "no market found for condition {}",
                    position.condition_id
                ))
            })?;
        self.normalizer.normalize(raw)
    }

    /// Case-insensitive keyword match on the oracle's free text
    fn says_sell(&self, answer: &str) -> bool {
        answer
            .to_lowercase()
            .contains(&self.config.sell_keyword.to_lowercase())
    }

    // ========================================================================
    // Shared steps
    // ========================================================================

    async fn consult(
        &self,
        record: &mut CycleRecord,
        step: &str,
        request: OracleRequest,
    ) -> Result<OracleReply> {
        let reply = self.oracle.propose(&request).await?;
        record.enter(
            CycleStage::LlmConsult,
            json!({"step": step, "prompt": request.prompt, "reply": reply}),
        );
        Ok(reply)
    }

    /// Price-history summaries for a market's tokens; fetch failures only log
    async fn history_text(&self, market: &MarketSnapshot, token_id: Option<&str>) -> String {
        let mut lines = Vec::new();
        for quote in &market.outcomes {
            if token_id.map_or(false, |id| id != quote.token_id) {
                continue;
            }
            match self
                .provider
                .fetch_price_history(&quote.token_id, &self.config.history_interval)
                .await
            {
                Ok(points) => lines.push(prompts::summarize_history(&quote.token_name, &points)),
                Err(e) => {
                    warn!(token_id = %quote.token_id, "Price history unavailable: {}", e);
                    lines.push(format!("{} token: price history unavailable.", quote.token_name));
                }
            }
        }
        lines.join("\n")
    }

    /// SUBMIT: exactly one gateway call, never retried
    async fn submit(&self, record: &mut CycleRecord, decision: OrderDecision) {
        record.enter(CycleStage::Submit, json!(decision));
        match self.gateway.submit(&decision).await {
            Ok(receipt) => {
                info!(
                    side = %decision.side,
                    token = %decision.token_name,
                    price = %decision.price,
                    size = %decision.size,
                    status = %receipt.status,
                    "Order submitted"
                );
                record.succeed(decision, receipt);
            }
            Err(e) => {
                warn!(kind = e.kind(), "Order submission failed: {}", e);
                record.fail(&e, Some(decision));
            }
        }
    }

    /// Journal the finished cycle; a journal failure never fails the cycle
    fn finish(&self, record: CycleRecord) -> CycleRecord {
        debug_assert!(record.is_finished(), "cycle journaled before it ended");
        if let Err(e) = self.audit.append(&record) {
            warn!("Could not write cycle record for {}: {}", record.subject, e);
        }
        info!(subject = %record.subject, status = ?record.status, "Cycle finished");
        record
    }
}

fn unexpected_call(call: &ToolCall) -> AgentError {
    AgentError::MalformedOracleResponse(format!("unexpected function {}", call.name()))
}
