//! Core types and trait definitions for the roster ingestion service.
//!
//! This crate is deliberately free of file-format, HTTP and database
//! dependencies. It owns the canonical record shape, the column mapper, and
//! the [`store::RosterStore`] abstraction every backend implements.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod error;
pub mod mapper;
pub mod record;
pub mod store;
pub mod table;
pub mod upload;

pub use error::{Error, Result};
