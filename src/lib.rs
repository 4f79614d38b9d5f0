//! Tally tracks discretionary spending, savings and debt goals, and spending
//! insights on top of local JSON storage.

pub mod errors;
pub mod tracker;
pub mod utils;

pub use errors::TallyError;
pub use tracker::{RecurringPredicate, Tally};

pub use tally_config as config;
pub use tally_core as core;
pub use tally_domain as domain;
pub use tally_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Tally tracing initialized.");
    });
}
