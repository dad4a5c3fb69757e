pub mod message;
pub mod profile;
pub mod user;
