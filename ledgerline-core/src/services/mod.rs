//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one group of contract operations.

mod account;
pub mod dispatch;
mod identity;
pub mod logging;
pub mod migration;
mod transfer;

#[cfg(test)]
pub(crate) mod testing;

pub use account::AccountService;
pub use dispatch::Operation;
pub use identity::IdentityService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService, OperationStats};
pub use migration::{MigrationResult, MigrationService};
pub use transfer::TransferService;
