//! Shared types and form logic for the Facility Ops Console
//!
//! This crate holds everything the add/edit pages have in common: the
//! dropdown normalizer, the detail hydrator, the line-item editor and the
//! submission payload builders. It is used by the console service layer
//! and, through WASM, by the browser.

pub mod editor;
pub mod error;
pub mod fields;
pub mod form;
pub mod hydrate;
pub mod models;
pub mod normalize;
pub mod notify;
pub mod payload;
pub mod types;
pub mod validation;

pub use editor::*;
pub use error::*;
pub use form::*;
pub use hydrate::*;
pub use models::*;
pub use normalize::*;
pub use notify::*;
pub use payload::*;
pub use types::*;
pub use validation::*;
