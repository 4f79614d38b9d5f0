//! tally-core
//!
//! Business logic and services for Tally.
//! Depends on tally-domain. Persistence goes through the [`storage::BlobStore`] trait.

pub mod auth_service;
pub mod balance_service;
pub mod breakdown_service;
pub mod category_service;
pub mod error;
pub mod goal_service;
pub mod insight_service;
pub mod period_service;
pub mod progress_service;
pub mod setup_service;
pub mod storage;
pub mod time;
pub mod transaction_service;

pub use auth_service::*;
pub use balance_service::*;
pub use breakdown_service::*;
pub use category_service::*;
pub use error::CoreError;
pub use goal_service::*;
pub use insight_service::*;
pub use period_service::*;
pub use progress_service::*;
pub use setup_service::*;
pub use transaction_service::*;
