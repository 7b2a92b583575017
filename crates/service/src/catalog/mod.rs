//! Catalog module: the service tree (domain, traversal helpers, step persistence, service).
//!
//! Nodes point at their parent; children are discovered by query and `level`
//! is maintained on every write.

pub mod domain;
pub mod service;
pub mod steps;
pub mod tree;

pub use service::CatalogService;

#[cfg(test)]
mod tests;
