//! Office registry: offices, office categories and location resolution.

pub mod domain;
pub mod location;
pub mod service;

pub use location::{LocationDirectory, SeaOrmLocationDirectory};
pub use service::OfficeRegistry;
