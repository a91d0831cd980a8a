//! Core library for the Torneo Abierto de Artes Marciales site.
//!
//! - `category`: birth date → age → competition category
//! - `normalize`: registration → flat spreadsheet export records
//! - `validation`: declarative field rules run before normalizing
//! - `schema`: versioned registration payloads migrated to the canonical form
//! - `wizard`: the three-step registration flow
//! - `api`: client for the spreadsheet-backed script endpoints
//! - `poller`: periodic competitor list refresh
//! - `event`: tournament details and countdown
//! - `sound`: injected audio feedback hooks

pub mod api;
pub mod category;
pub mod config;
pub mod event;
pub mod models;
pub mod normalize;
pub mod poller;
pub mod schema;
pub mod sound;
pub mod validation;
pub mod wizard;

pub use category::{classify, classify_age, parse_birth_date, AgeCategory, Classification};
pub use config::{Config, SubmitMode};
pub use normalize::{normalize, RegistrationId, SubmissionContext};
pub use validation::{FieldError, ValidationErrors};
