//! Read-only access to request inputs.
//!
//! Actions and validation steps never see the raw request. They get a
//! [`Params`] handle: path parameters, query parameters, and the body decoded
//! as JSON. Where those values come from is a [`ParamSource`]:
//!
//! - [`RequestParams`] — built by the router from the matched route.
//! - [`ParamBuilder`] — built by hand, for tests and synthetic invocations.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// The capability set behind a [`Params`] handle.
pub trait ParamSource: Send + Sync {
    /// Path parameter captured by the route pattern.
    fn param(&self, key: &str) -> &str;

    /// All values of a query parameter, in request order.
    fn queries(&self, key: &str) -> Vec<&str>;

    /// First value of a query parameter, `""` when absent.
    fn query(&self, key: &str) -> &str {
        self.queries(key).first().copied().unwrap_or_default()
    }

    /// Raw request body.
    fn body(&self) -> Result<&[u8], Error>;
}

/// Cheap, clonable handle to the inputs of one request.
///
/// ```rust
/// use resty::{BoxError, Context, Params, Reply, StatusCode};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Rename { name: String }
///
/// async fn rename(params: Params, _ctx: Context) -> Result<Reply, BoxError> {
///     let id = params.param("id");
///     let input: Rename = match params.scan_body() {
///         Ok(v) => v,
///         Err(e) => return Ok(Reply::text(e.to_string()).with_status(StatusCode::BAD_REQUEST)),
///     };
///     Ok(Reply::text(format!("{id} is now {}", input.name)))
/// }
/// ```
#[derive(Clone)]
pub struct Params(Arc<dyn ParamSource>);

impl Params {
    pub fn new(source: impl ParamSource + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Path parameter: for `/users/:id` on `/users/42`, `param("id")` is `"42"`.
    pub fn param(&self, key: &str) -> &str {
        self.0.param(key)
    }

    /// First value of query parameter `key`, or `""`.
    pub fn query(&self, key: &str) -> &str {
        self.0.query(key)
    }

    /// Every value of query parameter `key`; empty when absent.
    pub fn queries(&self, key: &str) -> Vec<&str> {
        self.0.queries(key)
    }

    /// Decodes the request body as JSON.
    ///
    /// Fails with [`Error::Decode`] on malformed JSON and [`Error::BodyRead`]
    /// when the body could not be read at all.
    pub fn scan_body<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(self.0.body()?)?)
    }
}

impl<S: ParamSource + 'static> From<S> for Params {
    fn from(source: S) -> Self { Self::new(source) }
}

// ── RequestParams ─────────────────────────────────────────────────────────────

/// Inputs of a routed HTTP request.
pub struct RequestParams {
    params: HashMap<String, String>,
    queries: Vec<(String, String)>,
    body: Result<Bytes, String>,
}

impl RequestParams {
    /// `query` is the raw query string without the leading `?`.
    pub fn new(
        params: HashMap<String, String>,
        query: Option<&str>,
        body: Result<Bytes, String>,
    ) -> Self {
        let queries = query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { params, queries, body }
    }
}

impl ParamSource for RequestParams {
    fn param(&self, key: &str) -> &str {
        self.params.get(key).map(String::as_str).unwrap_or_default()
    }

    fn queries(&self, key: &str) -> Vec<&str> {
        self.queries.iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn body(&self) -> Result<&[u8], Error> {
        match &self.body {
            Ok(bytes) => Ok(&bytes[..]),
            Err(e) => Err(Error::BodyRead(e.clone())),
        }
    }
}

// ── ParamBuilder ──────────────────────────────────────────────────────────────

/// Hand-built inputs for calling actions and validation steps without a
/// request.
///
/// Only the capabilities you configure exist. Touching any other one panics:
/// that is a bug in the calling code, not a runtime condition.
///
/// ```rust
/// use resty::{ParamBuilder, Params};
///
/// let params = Params::new(ParamBuilder::single("id", 42));
/// assert_eq!(params.param("id"), "42");
/// ```
///
/// ```rust,should_panic
/// use resty::{ParamBuilder, Params};
///
/// let params = Params::new(ParamBuilder::single("id", 42));
/// params.query("q"); // no query capability
/// ```
#[derive(Default)]
pub struct ParamBuilder {
    single: Option<(String, String)>,
    params: Option<HashMap<String, String>>,
    queries: Option<Vec<(String, String)>>,
    body: Option<Bytes>,
}

impl ParamBuilder {
    /// Accessor holding exactly one path parameter.
    pub fn single(key: impl Into<String>, value: impl Display) -> Self {
        Self { single: Some((key.into(), value.to_string())), ..Self::default() }
    }

    /// Adds a path parameter. Once set, unknown keys read as `""`.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.params.get_or_insert_default().insert(key.into(), value.to_string());
        self
    }

    /// Adds one value of a query parameter. Once set, unknown keys read as `""`.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.queries.get_or_insert_default().push((key.into(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl ParamSource for ParamBuilder {
    fn param(&self, key: &str) -> &str {
        if let Some(params) = &self.params {
            if let Some(v) = params.get(key) {
                return v;
            }
        }
        match &self.single {
            Some((k, v)) if k == key => v.as_str(),
            _ if self.params.is_some() => "",
            _ => panic!("this accessor does not support path parameter `{key}`"),
        }
    }

    fn queries(&self, key: &str) -> Vec<&str> {
        let Some(queries) = &self.queries else {
            panic!("this accessor does not support query parameters");
        };
        queries.iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn body(&self) -> Result<&[u8], Error> {
        match &self.body {
            Some(bytes) => Ok(&bytes[..]),
            None => panic!("this accessor does not support body scanning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Data {
        id: String,
        count: i32,
    }

    fn request(query: Option<&str>, body: &'static [u8]) -> Params {
        let params = HashMap::from([("id".to_owned(), "123".to_owned())]);
        Params::new(RequestParams::new(params, query, Ok(Bytes::from_static(body))))
    }

    #[test]
    fn request_params_expose_path_and_query() {
        let params = request(Some("q=test&tag=a&tag=b%20c"), b"");
        assert_eq!(params.param("id"), "123");
        assert_eq!(params.param("missing"), "");
        assert_eq!(params.query("q"), "test");
        assert_eq!(params.queries("tag"), vec!["a", "b c"]);
        assert_eq!(params.query("missing"), "");
        assert!(params.queries("missing").is_empty());
    }

    #[test]
    fn request_without_query_string() {
        let params = request(None, b"");
        assert_eq!(params.query("q"), "");
    }

    #[test]
    fn scan_body_decodes_json() {
        let params = request(None, br#"{"id":"ID1","count":3}"#);
        let data: Data = params.scan_body().unwrap();
        assert_eq!(data, Data { id: "ID1".into(), count: 3 });
    }

    #[test]
    fn scan_body_rejects_malformed_json() {
        let params = request(None, b"{not json");
        assert!(matches!(params.scan_body::<Data>(), Err(Error::Decode(_))));
    }

    #[test]
    fn scan_body_reports_unreadable_body() {
        let params = Params::new(RequestParams::new(
            HashMap::new(),
            None,
            Err("connection reset".into()),
        ));
        let err = params.scan_body::<Data>().unwrap_err();
        assert!(matches!(err, Error::BodyRead(ref m) if m == "connection reset"));
    }

    #[test]
    fn single_param_builder() {
        let params = Params::new(ParamBuilder::single("count", 7));
        assert_eq!(params.param("count"), "7");
    }

    #[test]
    #[should_panic(expected = "does not support query parameters")]
    fn single_param_builder_rejects_query() {
        Params::new(ParamBuilder::single("id", 1)).query("id");
    }

    #[test]
    #[should_panic(expected = "does not support query parameters")]
    fn single_param_builder_rejects_queries() {
        Params::new(ParamBuilder::single("id", 1)).queries("id");
    }

    #[test]
    #[should_panic(expected = "does not support path parameter `other`")]
    fn single_param_builder_rejects_other_keys() {
        Params::new(ParamBuilder::single("id", 1)).param("other");
    }

    #[test]
    #[should_panic(expected = "does not support body scanning")]
    fn single_param_builder_rejects_body() {
        let _ = Params::new(ParamBuilder::single("id", 1)).scan_body::<Data>();
    }

    #[test]
    fn builder_with_all_capabilities() {
        let params = Params::new(
            ParamBuilder::single("id", "ID9")
                .with_param("org", "acme")
                .with_query("tag", "a")
                .with_query("tag", "b")
                .with_body(r#"{"id":"ID9","count":1}"#),
        );
        assert_eq!(params.param("id"), "ID9");
        assert_eq!(params.param("org"), "acme");
        assert_eq!(params.param("unknown"), "");
        assert_eq!(params.query("tag"), "a");
        assert_eq!(params.queries("tag"), vec!["a", "b"]);
        assert_eq!(params.scan_body::<Data>().unwrap().count, 1);
    }
}
