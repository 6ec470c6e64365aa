//! # qcportal-client
//!
//! HTTP request layer for the QC portal.
//!
//! This crate provides:
//! - Request descriptions merged over per-executor defaults
//! - A request executor that publishes lifecycle state (loading, progress,
//!   error, data) through a watch channel
//! - A stateless API client for server-side upstream calls
//!
//! ## Overview
//!
//! Dashboard widgets drive a [`RequestExecutor`] and bind to its
//! [`RequestState`]: the busy flag flips on dispatch, progress advances while
//! the body downloads, and settlement atomically records either the payload
//! or the error message. Errors are also returned to the caller, so control
//! flow and display state never disagree.
//!
//! The portal backend uses the plain [`ApiClient`] instead, which shares the
//! same request merging but returns each response directly.
//!
//! ## Modules
//!
//! - [`api`] - Stateless request/response client
//! - [`error`] - Error type shared by both clients
//! - [`executor`] - Lifecycle-tracking request executor
//! - [`request`] - Request specs, defaults, and merging
//! - [`state`] - Observable lifecycle snapshot

pub mod api;
pub mod error;
pub mod executor;
pub mod request;
pub mod state;

pub use api::{ApiClient, ApiResponse};
pub use error::{ClientError, ClientResult};
pub use executor::{ProgressHandler, RequestExecutor};
pub use request::{RequestDefaults, RequestSpec, ResolvedRequest};
pub use state::RequestState;
