//! HTTP client module for the spreadsheet-backed script endpoints.
//!
//! This module provides the `SheetsClient` for submitting registration rows
//! and fetching the published competitor list. Both endpoints are Google
//! Apps Script web apps; neither requires authentication.

pub mod client;
pub mod error;

pub use client::{SheetsClient, SubmitOutcome};
pub use error::ApiError;
