//! Application layer: command and query handlers plus the timer driver.

pub mod catalog_loader;
pub mod command_handlers;
pub mod narration;
pub mod query_handlers;
pub mod timer_driver;
