//! Core library of the weather service conformance suite.
//!
//! This crate defines:
//! - The HTTP client wrapper that turns HTTP error statuses into values
//! - Query parameters, response modes and the endpoint configuration
//! - The parameterized scenarios and the tables they are generated from
//! - A sequential runner producing a serializable report
//!
//! It is used by `conformance-cli`, and by the integration tests of this crate.

pub mod catalog;
pub mod client;
pub mod config;
pub mod model;
pub mod payload;
pub mod runner;
pub mod scenario;

pub use client::{HttpServiceClient, ServiceClient};
pub use config::{Config, ServiceEndpoint};
pub use model::{CoordValue, Mode, Query, QueryOutcome};
pub use runner::{CaseResult, RunReport, Runner, Selection, Verdict};
pub use scenario::{AssertionFailure, Expectation, KeyChoice, Precision, Scenario, Suite};
