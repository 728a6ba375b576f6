//! Task dashboard core: task model, query engine, rule-based suggestions,
//! an in-memory store and the terminal front end built on top of them.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
