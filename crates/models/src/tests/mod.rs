/// Schema and constraint tests against a migrated in-memory database
pub mod schema_tests;
