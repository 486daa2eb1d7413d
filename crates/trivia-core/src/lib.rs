//! Trivia Core: shared domain types and collaborator contracts.
//!
//! This crate defines the data model, error type and the traits through
//! which the session engine reaches its collaborators (question catalog,
//! scoring backend, durable progress storage). It contains no
//! infrastructure code.

pub mod catalog;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ledger;
pub mod model;
pub mod store;
