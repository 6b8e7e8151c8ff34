//! Glow Core
//!
//! Core types shared by the Glow analysis client and its tooling.
//!
//! This crate contains:
//! - Domain types: the analysis job as observed by the client
//! - DTOs: request/response bodies of the analysis REST API

pub mod domain;
pub mod dto;
