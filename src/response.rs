//! Wire responses and the [`Reply`] → [`Response`] conversion.
//!
//! Every path through here writes exactly one status and one content type,
//! and decides both before the first body byte exists.

use std::convert::Infallible;
use std::io;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::reply::{ByteStream, Content, Reply, Resource};
use crate::sniff::{self, SNIFF_LEN};
use crate::validate::Errors;

const TEXT: &str = "text/plain; charset=utf-8";
const JSON: &str = "application/json; charset=utf-8";

/// Body of every response: buffered bytes or a stream read to completion.
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// An outgoing HTTP response.
pub type Response = http::Response<ResponseBody>;

// ── Conversion ────────────────────────────────────────────────────────────────

/// Turns an action's reply into the wire response.
///
/// A missing status becomes `200 OK`, or `204 No Content` for an empty reply.
pub(crate) async fn render(reply: Reply) -> Response {
    let (content, status) = reply.into_parts();
    let status = status.unwrap_or(match content {
        Content::Empty => StatusCode::NO_CONTENT,
        _ => StatusCode::OK,
    });

    match content {
        Content::Empty         => buffered(status, TEXT, Bytes::new()),
        Content::Text(s)       => buffered(status, TEXT, Bytes::from(s)),
        Content::Resource(res) => resource(status, res),
        Content::Stream(rd)    => sniffed(status, rd).await,
        Content::Json(json)    => match json.encode() {
            Ok(body) => buffered(status, JSON, Bytes::from(body)),
            Err(e) => {
                error!(error = %e, "failed to encode json reply");
                internal_error()
            }
        },
    }
}

fn resource(status: StatusCode, res: Resource) -> Response {
    let content_type = match HeaderValue::try_from(res.content_type) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "resource has an invalid content type");
            return internal_error();
        }
    };

    let mut response = http::Response::new(streamed(res.reader));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, content_type);
    if res.content_length > 0 {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(res.content_length));
    }
    response
}

/// Peeks up to [`SNIFF_LEN`] bytes to pick a content type, then sends the
/// peeked bytes followed by the rest of the stream.
async fn sniffed(status: StatusCode, mut reader: ByteStream) -> Response {
    let head = match peek(&mut reader).await {
        Ok(head) => head,
        Err(e) => {
            error!(error = %e, "failed to read from reply stream");
            return internal_error();
        }
    };
    if head.is_empty() {
        return buffered(StatusCode::NO_CONTENT, TEXT, Bytes::new());
    }

    let content_type = sniff::content_type(&head);
    let body = streamed(Box::new(io::Cursor::new(head).chain(reader)));
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Reads until the sniff window is full or the stream ends.
async fn peek<R: AsyncRead + Unpin + ?Sized>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut head = vec![0; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match reader.read(&mut head[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    head.truncate(filled);
    Ok(head)
}

// ── Canned responses ──────────────────────────────────────────────────────────

/// Status with its reason phrase as a plain-text body.
pub(crate) fn status_text(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or_default();
    buffered(status, TEXT, Bytes::from_static(reason.as_bytes()))
}

/// `500 Internal Server Error`, plain text.
pub(crate) fn internal_error() -> Response {
    status_text(StatusCode::INTERNAL_SERVER_ERROR)
}

/// `400 Bad Request` with `{"errors":[...]}`.
pub(crate) fn validation_failed(errors: &Errors) -> Response {
    match errors.to_json() {
        Ok(body) => buffered(StatusCode::BAD_REQUEST, JSON, Bytes::from(body)),
        Err(e) => {
            error!(error = %e, "failed to encode validation errors");
            internal_error()
        }
    }
}

// ── Body plumbing ─────────────────────────────────────────────────────────────

fn buffered(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let body = Full::new(body).map_err(|never: Infallible| match never {}).boxed_unsync();
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn streamed(reader: ByteStream) -> ResponseBody {
    StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use tokio::io::ReadBuf;

    use super::*;

    async fn body_of(response: Response) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn content_type(response: &Response) -> &str {
        response.headers()[CONTENT_TYPE].to_str().unwrap()
    }

    /// Yields at most `chunk` bytes per read, to exercise the peek loop.
    struct Trickle {
        data: &'static [u8],
        chunk: usize,
    }

    impl AsyncRead for Trickle {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let n = self.chunk.min(self.data.len()).min(buf.remaining());
            buf.put_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Poll::Ready(Ok(()))
        }
    }

    struct Broken;

    impl AsyncRead for Broken {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone")))
        }
    }

    #[tokio::test]
    async fn empty_without_status_is_no_content() {
        let response = render(Reply::empty()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn empty_with_status_keeps_it() {
        let response = render(Reply::empty().with_status(StatusCode::OK)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), TEXT);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn text_defaults_to_ok() {
        let response = render(Reply::text("test")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), TEXT);
        assert_eq!(body_of(response).await, "test");
    }

    #[tokio::test]
    async fn json_value() {
        let response = render(Reply::json(vec![123, 456]).with_status(StatusCode::CREATED)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(content_type(&response), JSON);
        assert_eq!(body_of(response).await, "[123,456]");
    }

    #[tokio::test]
    async fn resource_sets_declared_headers() {
        const S: &str = "This is a test!";
        let reply = Reply::resource(Resource::new("text/csv", S.len() as u64, S.as_bytes()));
        let response = render(reply).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "text/csv");
        assert_eq!(response.headers()[CONTENT_LENGTH], "15");
        assert_eq!(body_of(response).await, S);
    }

    #[tokio::test]
    async fn resource_without_length_omits_header() {
        let reply = Reply::resource(Resource::new("application/pdf", 0, &b"%PDF-"[..]));
        let response = render(reply).await;
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
        assert_eq!(body_of(response).await, "%PDF-");
    }

    #[tokio::test]
    async fn stream_is_sniffed_and_sent_whole() {
        let data: &'static [u8] = b"\x89PNG\r\n\x1A\nrest-of-the-image-data";
        let response = render(Reply::stream(Trickle { data, chunk: 3 })).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "image/png");
        assert_eq!(body_of(response).await, data);
    }

    #[tokio::test]
    async fn stream_longer_than_sniff_window() {
        let data: &'static [u8] = &[b'x'; SNIFF_LEN * 3];
        let response = render(Reply::stream(data)).await;
        assert_eq!(content_type(&response), TEXT);
        assert_eq!(body_of(response).await.len(), SNIFF_LEN * 3);
    }

    #[tokio::test]
    async fn empty_stream_is_no_content() {
        let response = render(Reply::stream(tokio::io::empty()).with_status(StatusCode::OK)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(content_type(&response), TEXT);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn broken_stream_is_internal_error() {
        let response = render(Reply::stream(Broken)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type(&response), TEXT);
        assert_eq!(body_of(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn unencodable_json_is_internal_error() {
        use std::collections::HashMap;

        let key_is_not_a_string = HashMap::from([(vec![1u8], 1)]);
        let response = render(Reply::json(key_is_not_a_string)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
