//! Data Transfer Objects for the analysis REST API
//!
//! Request and response bodies exchanged with the backend. Field names follow
//! the backend's camelCase JSON.

pub mod analysis;
