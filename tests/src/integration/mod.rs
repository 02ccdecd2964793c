//! # Integration Scenarios
//!
//! Drive a [`SessionHub`](ln_02_change_notifier::SessionHub) the way a ledger
//! core does: mutate the in-memory ledger, emit the matching signal, then
//! observe what subscribers receive.

pub mod fixtures;

mod market_flows;
mod subscription_flows;
