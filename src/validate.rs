//! Per-action validation steps and the registry that holds them.
//!
//! A validation step runs before its action and may reject the request in
//! two ways:
//!
//! - **soft** — push a message into [`Errors`] and return `Ok(())`. Every
//!   step still runs; the request is answered `400` with all messages.
//! - **fatal** — return `Err(_)`. Nothing else runs; the request is answered
//!   `500` and the failure is logged.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::context::Context;
use crate::error::BoxError;
use crate::handler::{Action, ActionId, BoxFuture};
use crate::params::Params;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Accumulates validation failure messages for one request.
///
/// Clones share the same list, so each step can hold its own handle.
/// Messages are only ever appended.
#[derive(Clone, Debug, Default)]
pub struct Errors(Arc<Mutex<Vec<String>>>);

impl Errors {
    pub fn new() -> Self { Self::default() }

    pub fn add(&self, message: impl Into<String>) {
        self.0.lock().push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.0.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Snapshot of the messages, in insertion order.
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// JSON body of a `400` answer: `{"errors":[...]}`.
    pub(crate) fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        #[derive(Serialize)]
        struct Body<'a> {
            errors: &'a [String],
        }

        let messages = self.0.lock();
        serde_json::to_vec(&Body { errors: &messages })
    }
}

impl<S: Into<String>> FromIterator<S> for Errors {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(Arc::new(Mutex::new(iter.into_iter().map(Into::into).collect())))
    }
}

// ── Validation steps ──────────────────────────────────────────────────────────

trait ErasedValidator: Send + Sync {
    fn call(&self, params: Params, ctx: Context, errors: Errors) -> BoxFuture<Result<(), BoxError>>;
}

struct FnValidator<F>(F);

impl<F, Fut, E> ErasedValidator for FnValidator<F>
where
    F: Fn(Params, Context, Errors) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn call(&self, params: Params, ctx: Context, errors: Errors) -> BoxFuture<Result<(), BoxError>> {
        let fut = (self.0)(params, ctx, errors);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

/// One registered validation step.
#[derive(Clone)]
pub struct Validator {
    name: &'static str,
    step: Arc<dyn ErasedValidator>,
}

impl Validator {
    /// Type name of the step function. For logs only.
    pub fn name(&self) -> &'static str { self.name }

    pub fn call(
        &self,
        params: Params,
        ctx: Context,
        errors: Errors,
    ) -> impl Future<Output = Result<(), BoxError>> + Send + use<> {
        self.step.call(params, ctx, errors)
    }
}

// ── Validators ────────────────────────────────────────────────────────────────

/// Registry mapping an [`Action`] identity to its ordered validation steps.
///
/// Fill it during startup and hand it to the
/// [`Router`](crate::Router). Clones share the same table; lookups and
/// registrations may overlap safely. Registration is append-only: steps are
/// never removed, reordered, or deduplicated.
#[derive(Clone, Default)]
pub struct Validators {
    table: Arc<RwLock<HashMap<ActionId, Vec<Validator>>>>,
}

impl Validators {
    pub fn new() -> Self { Self::default() }

    /// Appends `step` to the list of `action`.
    pub fn add<F, Fut, E>(&self, action: &Action, step: F) -> &Self
    where
        F: Fn(Params, Context, Errors) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let validator = Validator {
            name: std::any::type_name::<F>(),
            step: Arc::new(FnValidator(step)),
        };
        self.table.write().entry(action.id()).or_default().push(validator);
        self
    }

    /// Steps registered for `action`, in registration order.
    ///
    /// `None` means nothing was ever registered and validation is skipped.
    pub fn get(&self, action: &Action) -> Option<Vec<Validator>> {
        self.table.read().get(&action.id()).cloned()
    }

    /// Number of actions with at least one step.
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}
