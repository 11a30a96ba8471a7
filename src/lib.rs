//! # resty
//!
//! Write HTTP handlers as plain business logic: inputs in, a [`Reply`] or an
//! error out. resty runs the validators you attached to the handler, calls
//! it, and turns its reply into the right wire response.
//!
//! ## The contract
//!
//! An action never touches the request or the response:
//!
//! ```text
//! async fn action(params: Params, ctx: Context) -> Result<impl Into<Reply>, impl Into<BoxError>>
//! ```
//!
//! - `Ok(reply)`: sent as text, JSON, a declared resource, or a sniffed
//!   byte stream, with the status you chose (or `200` / `204`).
//! - `Err(_)`: logged, answered `500 Internal Server Error`. Whatever else
//!   the action computed is dropped.
//!
//! Validation steps attach to an [`Action`] through a [`Validators`]
//! registry and run, in registration order, before it:
//!
//! - messages pushed into [`Errors`] → `400` with `{"errors":[...]}`, the
//!   action never runs;
//! - a step returning `Err(_)` → `500`, nothing after it runs.
//!
//! What resty leaves to its collaborators:
//!
//! - Path matching and `:name` placeholders — [`matchit`]
//! - HTTP/1.1 and HTTP/2 transport — hyper
//! - Query-string decoding — `form_urlencoded`
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use resty::{Action, BoxError, Context, Errors, Params, Reply, Router, Server, StatusCode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, Serialize)]
//! struct User { id: String, name: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), resty::Error> {
//!     let create = Action::new(create_user);
//!
//!     let app = Router::new()
//!         .get("/users/:id", get_user)
//!         .post("/users", create.clone());
//!
//!     app.validators().add(&create, |params: Params, _ctx, errors: Errors| async move {
//!         if params.query("dry_run") == "yes" {
//!             errors.add("dry runs are not supported");
//!         }
//!         Ok::<_, BoxError>(())
//!     });
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn get_user(params: Params, _ctx: Context) -> Result<Reply, BoxError> {
//!     let id = params.param("id").to_owned();
//!     Ok(Reply::json(User { id, name: "alice".into() }))
//! }
//!
//! async fn create_user(params: Params, _ctx: Context) -> Result<Reply, BoxError> {
//!     match params.scan_body::<User>() {
//!         Ok(user) => Ok(Reply::json(user).with_status(StatusCode::CREATED)),
//!         Err(_) => Ok(Reply::bad_request()),
//!     }
//! }
//! ```

mod context;
mod dispatch;
mod error;
mod handler;
mod params;
mod reply;
mod response;
mod router;
mod server;
mod validate;

pub mod sniff;

pub use context::Context;
pub use dispatch::run as dispatch;
pub use error::{BoxError, Error};
pub use handler::{Action, ActionId, Handler};
pub use http::{Method, StatusCode};
pub use params::{ParamBuilder, ParamSource, Params, RequestParams};
pub use reply::{ByteStream, Content, Json, Reply, Resource};
pub use response::{Response, ResponseBody};
pub use router::Router;
pub use server::Server;
pub use validate::{Errors, Validator, Validators};
