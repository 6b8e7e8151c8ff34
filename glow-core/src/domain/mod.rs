//! Core domain types
//!
//! The server owns analysis jobs; the client only observes them. These types
//! mirror what the backend reports about a job and its stored result.

pub mod analysis;
