//! Per-request cancellation and deadline.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation signal and optional deadline for one request.
///
/// The server hands every request a child of its shutdown token, so a
/// SIGTERM or a disconnected client cancels it. Actions and validation steps
/// observe it cooperatively; the dispatcher never aborts them.
///
/// ```rust
/// use resty::{BoxError, Context, Params, Reply};
///
/// async fn slow_report(_params: Params, ctx: Context) -> Result<Reply, BoxError> {
///     tokio::select! {
///         () = ctx.cancelled() => Err("client went away".into()),
///         report = build_report() => Ok(Reply::text(report)),
///     }
/// }
/// # async fn build_report() -> String { String::new() }
/// ```
#[derive(Clone, Debug)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    pub fn new(token: CancellationToken, deadline: Option<Instant>) -> Self {
        Self { token, deadline }
    }

    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self { token: CancellationToken::new(), deadline: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the request is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline; `None` without one, zero once it passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(Instant::now()))
    }
}

impl Default for Context {
    fn default() -> Self { Self::background() }
}
