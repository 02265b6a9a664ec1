//! User Service Library
//!
//! Exposes the internal modules to the binary and the end-to-end tests.

pub mod config;
pub mod downstream;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

#[cfg(test)]
mod test_fakes;
