//! Item storage for the todo service.
//!
//! This crate provides a storage abstraction for todo items. It supports both
//! SQLite (for single-process deployments) and PostgreSQL (for several
//! instances sharing one database), selected once at startup through
//! [`Persistence`].

mod config;
mod error;
mod persistence;
mod postgres;
mod row;
mod sqlite;
mod traits;

pub use config::*;
pub use error::*;
pub use persistence::*;
pub use postgres::*;
pub use sqlite::*;
pub use traits::*;
