//! What an action hands back: a [`Content`] variant plus an optional status.
//!
//! The dispatcher turns a [`Reply`] into the wire response. You pick the
//! shape explicitly; nothing is inferred from runtime types.
//!
//! | Content | Wire body | Content-Type |
//! |---|---|---|
//! | [`Content::Empty`] | none | `text/plain; charset=utf-8` |
//! | [`Content::Text`] | the string | `text/plain; charset=utf-8` |
//! | [`Content::Resource`] | the reader, verbatim | declared by the resource |
//! | [`Content::Stream`] | the reader, verbatim | sniffed from the first 512 bytes |
//! | [`Content::Json`] | serde_json encoding | `application/json; charset=utf-8` |
//!
//! Without an explicit status the dispatcher answers `200 OK`, or
//! `204 No Content` for [`Content::Empty`].

use std::fmt;

use http::StatusCode;
use serde::Serialize;
use tokio::io::AsyncRead;

/// A byte source of unknown type and length.
pub type ByteStream = Box<dyn AsyncRead + Send + Unpin>;

// ── Content ───────────────────────────────────────────────────────────────────

/// The body shape of a [`Reply`].
pub enum Content {
    Empty,
    Text(String),
    Resource(Resource),
    Stream(ByteStream),
    Json(Json),
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty       => f.write_str("Empty"),
            Self::Text(s)     => f.debug_tuple("Text").field(s).finish(),
            Self::Resource(r) => f.debug_tuple("Resource").field(r).finish(),
            Self::Stream(_)   => f.write_str("Stream(..)"),
            Self::Json(_)     => f.write_str("Json(..)"),
        }
    }
}

/// A streamed body whose content type and length are known up front.
///
/// `content_length` is sent as `Content-Length` only when it is non-zero;
/// otherwise the body goes out chunked.
pub struct Resource {
    pub content_type: String,
    pub content_length: u64,
    pub reader: ByteStream,
}

impl Resource {
    pub fn new(
        content_type: impl Into<String>,
        content_length: u64,
        reader: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            content_length,
            reader: Box::new(reader),
        }
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Any serializable value, encoded by the dispatcher once the action returns.
pub struct Json(Box<dyn FnOnce() -> serde_json::Result<Vec<u8>> + Send>);

impl Json {
    pub fn new<T: Serialize + Send + 'static>(value: T) -> Self {
        Self(Box::new(move || serde_json::to_vec(&value)))
    }

    pub(crate) fn encode(self) -> serde_json::Result<Vec<u8>> {
        (self.0)()
    }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// Result value of an action.
///
/// ```rust
/// use resty::{Reply, StatusCode};
///
/// Reply::text("hello");                          // 200, text/plain
/// Reply::json(vec![1, 2, 3]);                    // 200, application/json
/// Reply::empty();                                // 204
/// Reply::empty().with_status(StatusCode::ACCEPTED);
/// Reply::not_found();                            // 404, "Not Found"
/// ```
#[derive(Debug)]
pub struct Reply {
    content: Content,
    status: Option<StatusCode>,
}

impl Reply {
    pub fn new(content: Content) -> Self {
        Self { content, status: None }
    }

    pub fn empty() -> Self {
        Self::new(Content::Empty)
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(Content::Text(body.into()))
    }

    pub fn json<T: Serialize + Send + 'static>(value: T) -> Self {
        Self::new(Content::Json(Json::new(value)))
    }

    pub fn resource(resource: Resource) -> Self {
        Self::new(Content::Resource(resource))
    }

    /// Raw bytes with a sniffed content type. A stream that is empty from the
    /// start answers `204 No Content`.
    pub fn stream(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self::new(Content::Stream(Box::new(reader)))
    }

    /// `200 OK` with a JSON body, or `204 No Content` for `None`.
    pub fn ok<T: Serialize + Send + 'static>(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::json(v).with_status(StatusCode::OK),
            None    => Self::empty().with_status(StatusCode::NO_CONTENT),
        }
    }

    /// The standard reason phrase as a plain-text body, e.g. `404 Not Found`.
    pub fn status_text(status: StatusCode) -> Self {
        Self::text(status.canonical_reason().unwrap_or_default()).with_status(status)
    }

    pub fn not_found() -> Self {
        Self::status_text(StatusCode::NOT_FOUND)
    }

    pub fn bad_request() -> Self {
        Self::status_text(StatusCode::BAD_REQUEST)
    }

    pub fn internal_server_error() -> Self {
        Self::status_text(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn content(&self) -> &Content { &self.content }
    pub fn status(&self) -> Option<StatusCode> { self.status }

    pub(crate) fn into_parts(self) -> (Content, Option<StatusCode>) {
        (self.content, self.status)
    }
}

impl From<Content> for Reply {
    fn from(content: Content) -> Self { Self::new(content) }
}

impl From<String> for Reply {
    fn from(body: String) -> Self { Self::text(body) }
}

impl From<&'static str> for Reply {
    fn from(body: &'static str) -> Self { Self::text(body) }
}

/// Return a bare status from an action: `Ok(StatusCode::ACCEPTED)`.
impl From<StatusCode> for Reply {
    fn from(status: StatusCode) -> Self { Self::empty().with_status(status) }
}

impl From<Resource> for Reply {
    fn from(resource: Resource) -> Self { Self::resource(resource) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_helpers() {
        let reply = Reply::not_found();
        assert_eq!(reply.status(), Some(StatusCode::NOT_FOUND));
        assert!(matches!(reply.content(), Content::Text(s) if s == "Not Found"));

        let reply = Reply::internal_server_error();
        assert!(matches!(reply.content(), Content::Text(s) if s == "Internal Server Error"));
    }

    #[test]
    fn ok_distinguishes_some_and_none() {
        let reply = Reply::ok(Some(vec![1]));
        assert_eq!(reply.status(), Some(StatusCode::OK));
        assert!(matches!(reply.content(), Content::Json(_)));

        let reply = Reply::ok(None::<Vec<i32>>);
        assert_eq!(reply.status(), Some(StatusCode::NO_CONTENT));
        assert!(matches!(reply.content(), Content::Empty));
    }

    #[test]
    fn json_encodes_lazily() {
        let Content::Json(json) = Reply::json(vec!["a", "b"]).into_parts().0 else {
            panic!("expected json content");
        };
        assert_eq!(json.encode().unwrap(), br#"["a","b"]"#);
    }

    #[test]
    fn bare_status_has_empty_content() {
        let reply = Reply::from(StatusCode::ACCEPTED);
        assert_eq!(reply.status(), Some(StatusCode::ACCEPTED));
        assert!(matches!(reply.content(), Content::Empty));
    }
}
