//! Session domain: pure state machines with no I/O beyond the progress store.

pub mod commands;
pub mod events;
pub mod planner;
pub mod session;
pub mod timer;
pub mod tracker;
