//! Unified error type.

use thiserror::Error;

/// Boxed application error returned by actions and validation steps.
///
/// Anything that converts into it is accepted: `std::io::Error`,
/// `serde_json::Error`, `String`, `&str`, your own error enums.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by resty's fallible operations.
///
/// Application-level outcomes (400, 404, 422, etc.) are expressed as
/// [`Reply`](crate::Reply) values, not as `Error`s. This type surfaces
/// infrastructure failures and request-body decoding problems.
#[derive(Debug, Error)]
pub enum Error {
    /// Binding to a port or accepting a connection failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The address passed to [`Server::bind`](crate::Server::bind) is not `host:port`.
    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    /// The request body is not valid JSON for the requested type.
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request body could not be read from the connection.
    #[error("decode: unreadable body: {0}")]
    BodyRead(String),
}
