//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! partner broker test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built provider payloads and partners
//! - `builders`: A provider client wired to a wiremock server
//! - `doubles`: Scripted cache store and counting authenticator
//! - `assertions`: Assertion helpers for `ProviderError`
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
