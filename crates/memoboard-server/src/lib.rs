//! # Memoboard Server Library
//!
//! Wires the storage core together: configuration, the MySQL pool, the feed
//! index backend and the services built on them. The `memoboard` binary is
//! a thin administrative front end over [`App`].

pub mod app;
pub mod cli;
pub mod logging;
pub mod startup;

pub use app::{App, AppBuilder, ComponentHealth, HealthReport, Services};
