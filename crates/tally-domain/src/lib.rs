//! tally-domain
//!
//! Pure domain models (Transaction, Goal, Category, Period, Insight, UserSetup).
//! No I/O, no storage. Only data types and core enums.

pub mod category;
pub mod common;
pub mod goal;
pub mod insight;
pub mod period;
pub mod setup;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use goal::*;
pub use insight::*;
pub use period::*;
pub use setup::*;
pub use transaction::*;
