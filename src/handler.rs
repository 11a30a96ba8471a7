//! Actions: business-logic functions with a stable identity.
//!
//! # From plain function to stored action
//!
//! ```text
//! async fn get_user(p: Params, c: Context) -> Result<Reply, BoxError>   ← user writes this
//!        ↓ Action::new(get_user)          (or implicitly by router.get(..))
//! Action { id: ActionId(7), name, Arc<FnHandler(get_user)> }
//!        ↓ validators.add(&action, step)   ← keyed by ActionId(7)
//!        ↓ router.get("/users/:id", action.clone())
//! action.call(params, ctx)  at request time  ← one vtable dispatch
//!        ↓
//! Box::pin(async { get_user(p, c).await.map(Into::into).map_err(Into::into) })
//! ```
//!
//! The identity is allocated once, in [`Action::new`]. Clones share it;
//! wrapping the same function twice yields two different identities. That
//! keeps validator lookup exact without comparing function pointers.

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::Context;
use crate::error::BoxError;
use crate::params::Params;
use crate::reply::Reply;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Send + 'static` let tokio move it across worker threads.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

trait ErasedHandler: Send + Sync {
    fn call(&self, params: Params, ctx: Context) -> BoxFuture<Result<Reply, BoxError>>;
}

struct FnHandler<F>(F);

impl<F, Fut, R, E> ErasedHandler for FnHandler<F>
where
    F: Fn(Params, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Into<Reply>,
    E: Into<BoxError>,
{
    fn call(&self, params: Params, ctx: Context) -> BoxFuture<Result<Reply, BoxError>> {
        let fut = (self.0)(params, ctx);
        Box::pin(async move { fut.await.map(Into::into).map_err(Into::into) })
    }
}

// ── ActionId ──────────────────────────────────────────────────────────────────

/// Process-unique identity of an [`Action`]. Validators are keyed by it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ActionId(u64);

impl ActionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// A registered handler: a plain function plus an opaque, stable identity.
///
/// Create the action once, attach validators to it, then route it:
///
/// ```rust
/// use resty::{Action, BoxError, Context, Errors, Params, Reply, Router};
///
/// async fn get_user(params: Params, _ctx: Context) -> Result<Reply, BoxError> {
///     Ok(Reply::text(params.param("id").to_owned()))
/// }
///
/// let get_user = Action::new(get_user);
/// let router = Router::new().get("/users/:id", get_user.clone());
///
/// router.validators().add(&get_user, |params: Params, _ctx, errors: Errors| async move {
///     if params.param("id").parse::<u64>().is_err() {
///         errors.add("id must be numeric");
///     }
///     Ok::<_, BoxError>(())
/// });
/// ```
#[derive(Clone)]
pub struct Action {
    id: ActionId,
    name: &'static str,
    handler: Arc<dyn ErasedHandler>,
}

impl Action {
    pub fn new<F, Fut, R, E>(handler: F) -> Self
    where
        F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Into<Reply> + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            id: ActionId::next(),
            name: type_name::<F>(),
            handler: Arc::new(FnHandler(handler)),
        }
    }

    pub fn id(&self) -> ActionId { self.id }

    /// Type name of the wrapped function. For logs only, never for lookup.
    pub fn name(&self) -> &'static str { self.name }

    /// Runs the handler alone, without validation.
    pub fn call(
        &self,
        params: Params,
        ctx: Context,
    ) -> impl Future<Output = Result<Reply, BoxError>> + Send + use<> {
        self.handler.call(params, ctx)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Anything the router accepts as a route target.
///
/// Satisfied by an [`Action`] and by every function with the signature
///
/// ```text
/// async fn name(params: Params, ctx: Context) -> Result<impl Into<Reply>, impl Into<BoxError>>
/// ```
///
/// A bare function gets a fresh [`Action`] on registration. Wrap it yourself
/// when you need the identity to attach validators.
///
/// The trait is **sealed**: only the impls below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_action(self) -> Action;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R, E> private::Sealed for F
where
    F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Into<Reply> + 'static,
    E: Into<BoxError> + 'static,
{
}

impl<F, Fut, R, E> Handler for F
where
    F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Into<Reply> + 'static,
    E: Into<BoxError> + 'static,
{
    fn into_action(self) -> Action {
        Action::new(self)
    }
}

impl private::Sealed for Action {}

impl Handler for Action {
    fn into_action(self) -> Action { self }
}
