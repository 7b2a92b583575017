//! Service layer of the government services directory, on top of `models`.
//! - Catalog tree of services with ordered procedural steps.
//! - Office registry with location resolution.
//! - Office-service claim ledger and the service request review workflow.
//! - Every operation takes the caller's `Principal` and fails with a typed `ServiceError`.

pub mod errors;
pub mod identity;
pub mod catalog;
pub mod office;
pub mod claims;
pub mod requests;
pub mod provisioning;
pub mod stats;
#[cfg(test)]
pub mod test_support;

pub use catalog::CatalogService;
pub use claims::ClaimLedger;
pub use errors::ServiceError;
pub use identity::Principal;
pub use office::OfficeRegistry;
pub use provisioning::OfficeAdminProvisioner;
pub use requests::RequestWorkflow;
