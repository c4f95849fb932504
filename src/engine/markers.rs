use crate::constants::marker_color;
use crate::models::{Marker, MarkerPosition, MarkerShape, Symbol, Trade, TradeSide};
use std::collections::HashSet;

/// Builds the trade overlay for the price chart
///
/// Filtering by symbol happens here: the backend's `?symbol=` filter is not relied on.
pub struct MarkerReconciler;

impl MarkerReconciler {
    /// One marker per trade of `active`, ascending by time
    ///
    /// Trades sharing a timestamp keep their log order. A trade id repeated in the
    /// log yields a single marker (first occurrence).
    pub fn reconcile(trades: &[Trade], active: &Symbol) -> Vec<Marker> {
        let mut seen_ids = HashSet::new();
        let mut markers: Vec<Marker> = trades
            .iter()
            .filter(|trade| &trade.symbol == active)
            .filter(|trade| seen_ids.insert(trade.id))
            .map(Self::marker_for)
            .collect();

        markers.sort_by_key(|m| m.time);
        markers
    }

    fn marker_for(trade: &Trade) -> Marker {
        let time = trade.timestamp.timestamp();
        match trade.side {
            TradeSide::Buy => Marker {
                time,
                side: TradeSide::Buy,
                position: MarkerPosition::BelowBar,
                shape: MarkerShape::ArrowUp,
                color: marker_color::BUY.to_string(),
                text: "Buy".to_string(),
                trade_id: trade.id,
            },
            TradeSide::Sell => Marker {
                time,
                side: TradeSide::Sell,
                position: MarkerPosition::AboveBar,
                shape: MarkerShape::ArrowDown,
                color: marker_color::SELL.to_string(),
                text: match trade.realized_profit() {
                    Some(profit) => format!("Sell ({})", Self::signed_profit(profit)),
                    None => "Sell".to_string(),
                },
                trade_id: trade.id,
            },
        }
    }

    /// `+` only above zero; break-even reads `0.00`
    fn signed_profit(profit: f64) -> String {
        if profit > 0.0 {
            format!("+{:.2}", profit)
        } else if profit == 0.0 {
            "0.00".to_string()
        } else {
            format!("{:.2}", profit)
        }
    }
}
