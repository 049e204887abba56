//! Mock authenticated file-transfer API.
//!
//! The server half simulates a file backend: session tokens issued at login,
//! a uniform `{code, message, data}` envelope on every JSON endpoint, and
//! staged-delay "chunked" transfers that return their payload in one shot.
//! The client half owns the session lifecycle (login, logout, rehydration,
//! cascading invalidation) and drives uploads/downloads with the session
//! token attached as a bearer credential.

pub mod client;
pub mod common;
pub mod server;
