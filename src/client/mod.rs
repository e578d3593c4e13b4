//! Client-side session handling and the unpersisted health journals.

pub mod api;
pub mod dashboard;
pub mod journal;
pub mod routes;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Errors surfaced to the client views.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Durable token storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A form or command failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}
