//! Claim ledger: the office-service claim state machine.
//!
//! ```text
//! (no row) --claim--> CLAIMED --revoke--> REVOKED --claim--> CLAIMED
//! ```

pub mod domain;
pub mod service;

pub use service::ClaimLedger;

#[cfg(test)]
mod tests;
