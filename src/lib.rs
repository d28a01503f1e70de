#![doc(test(attr(deny(warnings))))]

//! Personal-finance core: transactions, savings goals and recurring templates over a
//! pluggable row store, plus the due-date evaluator that turns templates into transactions.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod storage;
pub mod utils;

pub use crate::core::errors::{Result, SpendError};

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes global tracing and emits a startup log.
pub fn init() {
    INIT.call_once(|| {
        utils::init_tracing();
        tracing::debug!("spendwise core initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
    }
}
