//! Error types for the monitor pipeline.

use std::io;

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening, listening on, or dumping a
/// netlink event stream.
///
/// Kernel-reported protocol errors (`NLMSG_ERROR` frames) are not
/// represented here: they decode into
/// [`ErrorMessage`](crate::netlink::messages::ErrorMessage) and flow
/// through the delivery queue as data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations or the output sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unrecognized selector token in a dump request.
    ///
    /// Detected before any socket is created; the caller can fix the
    /// input and retry.
    #[error("unknown selector: {token}")]
    UnknownSelector {
        /// The token that did not match any message kind or scope modifier.
        token: String,
    },

    /// A frame carried a type code outside the monitored set.
    #[error("unknown message type code: {code}")]
    UnknownType {
        /// The nlmsg_type value that had no variant constructor.
        code: u16,
    },

    /// Message or header was shorter than its fixed-size layout.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected length.
        expected: usize,
        /// Actual bytes available.
        actual: usize,
    },

    /// Invalid message framing (e.g. declared length exceeds the buffer).
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute encoding (declared length exceeds the remaining
    /// payload, or a typed value is shorter than its type requires).
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Network namespace enumeration or entry failed.
    #[error("namespace error: {0}")]
    Namespace(String),
}

impl Error {
    /// True for failures detected before any kernel resource exists.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnknownSelector { .. })
    }

    /// True for failures that make the stream position untrustworthy.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::UnknownType { .. }
                | Self::Truncated { .. }
                | Self::InvalidMessage(_)
                | Self::InvalidAttribute(_)
        )
    }
}
