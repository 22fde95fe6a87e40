//! Core domain entities
//!
//! Pure data structures with validation and decoding logic - no I/O or
//! external dependencies.

pub mod balance;
pub mod identity;
pub mod result;

pub use balance::{AccountBalance, Balance, TransferRequest};
pub use identity::{Affiliation, CallerData, EcertResponse, InvocationContext, PEER_ADDRESS_KEY};
