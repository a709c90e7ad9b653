pub mod chat;
pub mod user;
