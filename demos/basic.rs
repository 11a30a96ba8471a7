//! Minimal resty example: JSON CRUD endpoints with a validated action.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/abc          # 400, id must be numeric
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/users/42
//!   curl http://localhost:3000/users/42/avatar

use std::time::Duration;

use resty::{Action, BoxError, Context, Errors, Params, Reply, Resource, Router, Server, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct CreateUser {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), resty::Error> {
    tracing_subscriber::fmt::init();

    let get_user = Action::new(get_user);

    let app = Router::new()
        .get("/users/:id",        get_user.clone())
        .post("/users",           create_user)
        .delete("/users/:id",     delete_user)
        .get("/users/:id/avatar", avatar);

    app.validators().add(&get_user, numeric_id);

    Server::bind("0.0.0.0:3000")
        .request_timeout(Duration::from_secs(5))
        .serve(app)
        .await
}

// Soft failure: the message ends up in the 400 body.
async fn numeric_id(params: Params, _ctx: Context, errors: Errors) -> Result<(), BoxError> {
    if params.param("id").parse::<u64>().is_err() {
        errors.add("id must be numeric");
    }
    Ok(())
}

// GET /users/:id
async fn get_user(params: Params, _ctx: Context) -> Result<Reply, BoxError> {
    let id = params.param("id").parse()?;
    Ok(Reply::json(User { id, name: "alice".into() }))
}

// POST /users
//
// A malformed body is the client's fault: answer 400 ourselves instead of
// returning the error, which would become a 500.
async fn create_user(params: Params, _ctx: Context) -> Result<Reply, BoxError> {
    let input: CreateUser = match params.scan_body() {
        Ok(input) => input,
        Err(e) => return Ok(Reply::text(e.to_string()).with_status(StatusCode::BAD_REQUEST)),
    };
    Ok(Reply::json(User { id: 99, name: input.name }).with_status(StatusCode::CREATED))
}

// DELETE /users/:id → 204 No Content
async fn delete_user(_params: Params, _ctx: Context) -> Result<Reply, BoxError> {
    Ok(Reply::empty())
}

// GET /users/:id/avatar → streamed with a declared type and length
async fn avatar(_params: Params, _ctx: Context) -> Result<Resource, BoxError> {
    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"/>"#;
    Ok(Resource::new("image/svg+xml", SVG.len() as u64, SVG.as_bytes()))
}
