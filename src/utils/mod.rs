pub mod auth;
pub mod inference;
pub mod report;
