//! Session authority: account lifecycle and revocable bearer tokens.

pub mod extract;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod store;
