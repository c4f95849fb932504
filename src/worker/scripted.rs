//! Deterministic in-process `DataSource` for engine and cycle tests
//!
//! Payloads are derived from the symbol so tests can tell sessions apart.
//! Individual (group, symbol) requests can be held open until released, which
//! lets a test force a late resolution after a symbol switch.

use crate::error::AppError;
use crate::models::{BotStats, BotStatus, Candle, EquityPoint, Symbol, Ticker24h, Trade, TradeSide};
use crate::services::{DataGroup, DataSource, FetchFuture, Payload};
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

#[derive(Default)]
pub struct ScriptedSource {
    calls: Mutex<HashMap<(DataGroup, Symbol), usize>>,
    gates: Mutex<HashMap<(DataGroup, Symbol), watch::Receiver<bool>>>,
    failing: Mutex<HashSet<DataGroup>>,
    history: Mutex<Option<Vec<Trade>>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold every request for (group, symbol) until `true` is sent on the returned handle
    pub fn hold(&self, group: DataGroup, symbol: &Symbol) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        self.gates
            .lock()
            .unwrap()
            .insert((group, symbol.clone()), rx);
        tx
    }

    pub fn fail(&self, group: DataGroup) {
        self.failing.lock().unwrap().insert(group);
    }

    pub fn recover(&self, group: DataGroup) {
        self.failing.lock().unwrap().remove(&group);
    }

    /// Replace the trade log served for every symbol
    pub fn set_history(&self, trades: Vec<Trade>) {
        *self.history.lock().unwrap() = Some(trades);
    }

    pub fn calls(&self, group: DataGroup, symbol: &Symbol) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(group, symbol.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn base_price(symbol: &Symbol) -> f64 {
        match symbol.as_str() {
            "BTC/BRL" => 350_000.0,
            "ETH/BRL" => 18_000.0,
            _ => 100.0,
        }
    }

    /// Mixed-symbol trade log: the backend is not trusted to filter
    pub fn mixed_history() -> Vec<Trade> {
        vec![
            trade(10, "ETH/BRL", TradeSide::Buy, 1_000, None),
            trade(12, "BTC/BRL", TradeSide::Sell, 2_000, Some(5.5)),
            trade(11, "BTC/BRL", TradeSide::Buy, 1_500, None),
            trade(13, "ETH/BRL", TradeSide::Sell, 3_000, Some(0.0)),
        ]
    }

    pub fn payload(&self, group: DataGroup, symbol: &Symbol) -> Payload {
        let base = Self::base_price(symbol);
        match group {
            DataGroup::Stats => Payload::Stats(BotStats {
                total_profit: base / 1000.0,
                win_rate: 50.0,
                total_trades: Some(2),
                profit_factor: None,
                sharpe_ratio: None,
                max_drawdown: None,
                last_trade: None,
            }),
            DataGroup::History => Payload::History(
                self.history
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(Self::mixed_history),
            ),
            DataGroup::BotStatus => Payload::BotStatus(Some(BotStatus {
                is_positioned: true,
                entry_price: Some(base * 0.99),
                quantity: Some(0.01),
                stop_price: Some(base * 0.98),
                peak_price: None,
                available_balance: 1_000.0,
            })),
            DataGroup::Price => Payload::Price(base),
            DataGroup::AiStatus => Payload::AiStatus(None),
            DataGroup::Candles => Payload::Candles(vec![
                Candle::new(60, base, base * 1.01, base * 0.99, base),
                Candle::new(120, base, base * 1.01, base * 0.99, base * 1.005),
                Candle::new(180, base * 1.005, base * 1.02, base, base * 1.01),
            ]),
            DataGroup::Ticker => Payload::Ticker(Ticker24h {
                pair: symbol.exchange_pair(),
                last_price: base,
                change_pct: 1.5,
                high: base * 1.02,
                low: base * 0.97,
                volume: 10.0,
                quote_volume: base * 10.0,
            }),
            DataGroup::Equity => Payload::Equity(vec![
                EquityPoint::new(100, 10.0),
                EquityPoint::new(100, 12.0),
                EquityPoint::new(90, 5.0),
            ]),
        }
    }
}

pub fn trade(id: i64, symbol: &str, side: TradeSide, ts: i64, profit: Option<f64>) -> Trade {
    Trade {
        id,
        symbol: Symbol::new(symbol).unwrap(),
        side,
        price: 100.0,
        quantity: Some(1.0),
        profit,
        timestamp: Utc.timestamp_opt(ts, 0).unwrap(),
    }
}

impl DataSource for ScriptedSource {
    fn fetch(&self, group: DataGroup, symbol: &Symbol) -> FetchFuture {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((group, symbol.clone()))
            .or_insert(0) += 1;

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get(&(group, symbol.clone()))
            .cloned();

        let result = if self.failing.lock().unwrap().contains(&group) {
            Err(AppError::Network(format!("scripted failure for {}", group)))
        } else {
            Ok(self.payload(group, symbol))
        };

        Box::pin(async move {
            if let Some(mut gate) = gate {
                let _ = gate.wait_for(|open| *open).await;
            }
            result
        })
    }
}
