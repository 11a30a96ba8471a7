//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Path patterns belong to
//! [`matchit`]: `:name` captures one segment, `*name` the rest of the path.
//! Every registered target is an [`Action`]; the router only matches, builds
//! the [`Params`], and hands over to the dispatcher.

use std::collections::HashMap;
use std::fmt::Display;

use http::{Method, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Body;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::context::Context;
use crate::dispatch;
use crate::handler::{Action, Handler};
use crate::params::{Params, RequestParams};
use crate::response::{self, Response};
use crate::validate::Validators;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally. The router owns
/// a [`Validators`] registry consulted before every action runs.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Action>>,
    validators: Validators,
}

impl Router {
    /// A router with its own, empty validator registry.
    pub fn new() -> Self {
        Self::with_validators(Validators::new())
    }

    /// A router sharing an existing registry.
    pub fn with_validators(validators: Validators) -> Self {
        Self { routes: HashMap::new(), validators }
    }

    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// ```rust
    /// # use resty::{BoxError, Context, Method, Params, Reply, Router};
    /// # async fn get_user(_: Params, _: Context) -> Result<Reply, BoxError> { Ok(Reply::empty()) }
    /// # async fn create_user(_: Params, _: Context) -> Result<Reply, BoxError> { Ok(Reply::empty()) }
    /// # async fn delete_user(_: Params, _: Context) -> Result<Reply, BoxError> { Ok(Reply::empty()) }
    /// Router::new()
    ///     .on(Method::DELETE, "/users/:id", delete_user)
    ///     .on(Method::GET,    "/users/:id", get_user)
    ///     .on(Method::POST,   "/users",     create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with an earlier
    /// registration for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_action())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    pub fn head(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::HEAD, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn options(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::OPTIONS, path, handler)
    }

    /// Routes one request and produces its response.
    ///
    /// Unmatched method/path pairs answer `404 Not Found`. The body is read
    /// in full only once a route matched.
    pub async fn dispatch<B>(&self, req: http::Request<B>, ctx: Context) -> Response
    where
        B: Body,
        B::Error: Display,
    {
        let Some((action, params)) = self.lookup(req.method(), req.uri().path()) else {
            return response::status_text(StatusCode::NOT_FOUND);
        };
        debug!(method = %req.method(), path = req.uri().path(), action = action.name(), "dispatching");

        let query = req.uri().query().map(str::to_owned);
        let body = match req.into_body().collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) => Err(e.to_string()),
        };
        let params = Params::new(RequestParams::new(params, query.as_deref(), body));

        dispatch::run(&action, &self.validators, params, ctx).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(Action, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let action = matched.value.clone();
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((action, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
