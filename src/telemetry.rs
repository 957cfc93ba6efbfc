//! Standardized span constructors for relay observability.

pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for an accepted client connection.
    pub fn connection(uid: &str, ip: &str) -> Span {
        info_span!("connection", uid = %uid, ip = %ip)
    }

    /// Create a span for a session's outbound writer task.
    pub fn writer(uid: &str, identity: &str) -> Span {
        info_span!("writer", uid = %uid, identity = %identity)
    }
}
