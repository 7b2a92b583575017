pub mod errors;
pub mod db;
pub mod enums;
pub mod category;
pub mod service_node;
pub mod service_category;
pub mod service_step;
pub mod step_document;
pub mod step_fee;
pub mod step_time_requirement;
pub mod step_working_hours;
pub mod step_authority;
pub mod step_office_category;
pub mod office_category;
pub mod location;
pub mod office;
pub mod user;
pub mod user_credentials;
pub mod office_service;
pub mod service_request;

#[cfg(test)]
mod tests;
