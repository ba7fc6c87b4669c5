//! Library exports for eatsgate, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod interceptor;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod reviews;
pub mod routes;
pub mod startup;
pub mod state;
pub mod summarizer;
pub mod utils;
