pub mod auth;
pub mod transfer;
pub mod users;
