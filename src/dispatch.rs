//! Validation, then invocation, then conversion: one request through one action.

use tracing::{debug, error};

use crate::context::Context;
use crate::handler::Action;
use crate::params::Params;
use crate::response::{self, Response};
use crate::validate::{Errors, Validators};

/// Runs `action` for one request and produces its response.
///
/// Never fails and never panics on application errors: fatal validation
/// steps and action errors become `500`, collected validation messages
/// become `400`.
pub async fn run(action: &Action, validators: &Validators, params: Params, ctx: Context) -> Response {
    if let Some(steps) = validators.get(action) {
        let errors = Errors::new();
        for (index, step) in steps.iter().enumerate() {
            if let Err(e) = step.call(params.clone(), ctx.clone(), errors.clone()).await {
                error!(
                    action = action.name(),
                    action_id = %action.id(),
                    step = index,
                    validator = step.name(),
                    error = %e,
                    "validation step failed"
                );
                return response::internal_error();
            }
        }
        if errors.has_errors() {
            debug!(action = action.name(), rejected = errors.len(), "validation rejected request");
            return response::validation_failed(&errors);
        }
    }

    match action.call(params, ctx).await {
        Ok(reply) => response::render(reply).await,
        Err(e) => {
            error!(action = action.name(), action_id = %action.id(), error = %e, "action failed");
            response::internal_error()
        }
    }
}
