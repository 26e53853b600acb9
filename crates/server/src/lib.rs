//! Medibook server library.
//!
//! This crate provides the booking service as a library, allowing it to be
//! tested end-to-end and reused by the integration-test harness.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
