//! Shared test support: the fixture site and scratch Postgres databases.
//!
//! Postgres suites read `ASTERISM_PG_DSN` through [`env_dsn`] and skip themselves when it is
//! unset. Each run gets its own database, dropped afterwards.

pub mod fixtures;

mod database;
mod error;

pub use database::{TestDatabase, env_dsn};
pub use error::{Error, Result};
