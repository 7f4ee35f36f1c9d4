//! HTTP plumbing for the coaching API.
//!
//! # Architecture
//!
//! * [`transport`]: request/response types, the [`Transport`] seam and its
//!   `reqwest` implementation.
//! * [`client`]: [`ApiClient`], status classification and JSON decoding.
//! * [`error`]: the [`ApiError`] taxonomy and user-facing notices.

pub mod client;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, Credential, Method, RawResponse, ReqwestTransport, Transport};
