//! Service request workflow: `PENDING -> APPROVED | REJECTED`.

pub mod domain;
pub mod service;

pub use service::RequestWorkflow;
