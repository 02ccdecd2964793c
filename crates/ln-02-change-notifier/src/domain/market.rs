//! Market fan-out grouping
//!
//! Changes are bucketed by canonical trading pair so that each subscribed
//! market receives exactly one batch per ledger signal.

use std::collections::BTreeMap;

use serde::Serialize;
use shared_types::{Operation, OperationHistoryObject, OperationResult, TradingPair};

/// Per-pair queues built while walking one change batch.
///
/// Queues keep insertion order; pairs iterate in canonical order.
#[derive(Debug)]
pub struct MarketQueues<T> {
    queues: BTreeMap<TradingPair, Vec<T>>,
}

impl<T> Default for MarketQueues<T> {
    fn default() -> Self {
        Self {
            queues: BTreeMap::new(),
        }
    }
}

impl<T> MarketQueues<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: TradingPair, item: T) {
        self.queues.entry(pair).or_default().push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Number of pairs with at least one item
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn get(&self, pair: &TradingPair) -> Option<&[T]> {
        self.queues.get(pair).map(Vec::as_slice)
    }

    pub fn into_batches(self) -> impl Iterator<Item = (TradingPair, Vec<T>)> {
        self.queues.into_iter()
    }
}

/// One fill as delivered to market subscribers: serialized as `[op, result]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FillEntry(pub Operation, pub OperationResult);

/// Group the fill operations applied in a block by trading pair, keeping
/// only pairs accepted by `subscribed`. Non-fill operations are ignored.
pub fn group_fills<'a, I, F>(applied: I, subscribed: F) -> MarketQueues<FillEntry>
where
    I: IntoIterator<Item = &'a OperationHistoryObject>,
    F: Fn(&TradingPair) -> bool,
{
    let mut queues = MarketQueues::new();
    for entry in applied {
        let Some(pair) = entry.op.fill_market() else {
            continue;
        };
        if pair.is_degenerate() || !subscribed(&pair) {
            continue;
        }
        queues.push(pair, FillEntry(entry.op.clone(), entry.result.clone()));
    }
    queues
}
