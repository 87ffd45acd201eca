//! Core entity definitions for the todo service.
//!
//! This crate defines the todo item shared by every storage backend and the
//! HTTP layer, together with the validation rules applied to caller input.

mod item;

pub use item::*;
