//! Trivia session API: configuration, error mapping, routes and state.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
