//! Core engine for the disbursement load-test driver.
//!
//! A run has two phases, mirroring the original test plan: a setup phase
//! that fetches an OAuth bearer token via the client-credentials grant,
//! and a load phase where virtual users issue weighted-random
//! `clientDisbursementCreate` mutations and check each response for
//! HTTP 200. Aggregation beyond the JSON report is out of scope.

pub mod auth;
pub mod config;
pub mod engine;
pub mod errors;
pub mod graphql;
pub mod model;
pub mod random;
pub mod report;
