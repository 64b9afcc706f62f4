//! A minimal client for Plaid's JSON REST API.
//!
//! Covers the handful of endpoints passbook needs: link token creation,
//! public token exchange, transaction retrieval, and item lookup/removal.
//! Credentials ride along in every request body, which is how Plaid's API
//! authenticates non-SDK callers.

pub mod client;
pub mod model;

pub use client::{Builder, ClientError, Credentials, Environment, Plaid};
