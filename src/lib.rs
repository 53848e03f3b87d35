#![warn(missing_docs)]
//! Monitor inventory aggregation: reads monitor configuration records page by
//! page, resolves their location labels and summarizes the inventory.

pub mod cmd;
pub mod config;
pub mod engine;
pub mod models;
pub mod persistence;
pub mod providers;
pub mod test_helpers;
