//! HTTP routes
//!
//! Every resource shares the same list/create/get/update/delete handlers,
//! instantiated per entity type. Store calls run on the blocking pool.

mod children;
mod error;
mod meals;
mod mood_logs;
mod recipes;

use axum::extract::{FromRequest, FromRequestParts, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::build_info::BuildInfo;
use crate::models::{Listed, QueryParams};
use crate::store::{Entity, Store, StoreResult};
use crate::validation::FromJson;

pub use error::ApiError;

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON request body; malformed JSON is a 400 in the common error shape
#[derive(FromRequest, Deserialize)]
#[from_request(via(axum::Json), rejection(ApiError))]
#[serde(transparent)]
pub struct Payload(Value);

/// Single integer path segment
#[derive(FromRequestParts, Deserialize)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
#[serde(transparent)]
pub struct Id(i64);

/// Raw query string parameters
#[derive(FromRequestParts, Deserialize)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
#[serde(transparent)]
pub struct Params(QueryParams);

/// Build the application router
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(children::routes())
        .merge(meals::routes())
        .merge(mood_logs::routes())
        .merge(recipes::routes())
        .fallback(unknown_route)
        .layer(middleware::map_response(method_not_allowed))
        .with_state(store)
}

async fn unknown_route(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Give the router's bodiless 405 the common error shape, keeping `Allow`
async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut shaped = ApiError::MethodNotAllowed("Method not allowed on this route".to_string())
        .into_response();
    if let Some(allow) = allow {
        shaped.headers_mut().insert(header::ALLOW, allow);
    }
    shaped
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "build": BuildInfo::current(),
    }))
}

/// Run a store operation off the async runtime
async fn blocking<F, T>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

async fn list<E>(State(store): State<Store>, Params(params): Params) -> ApiResult<Json<Vec<E>>>
where
    E: Listed + Serialize,
{
    let filter = E::filter_from_query(&params)?;
    let records = blocking(move || store.list::<E>(&filter)).await?;
    Ok(Json(records))
}

async fn create<E>(
    State(store): State<Store>,
    Payload(body): Payload,
) -> ApiResult<(StatusCode, Json<E>)>
where
    E: Entity + Serialize,
{
    let input = <E::Create as FromJson>::from_json(&body)?;
    let record = blocking(move || store.create::<E>(&input)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn fetch<E>(State(store): State<Store>, Id(id): Id) -> ApiResult<Json<E>>
where
    E: Entity + Serialize,
{
    let record = blocking(move || store.get::<E>(id)).await?;
    Ok(Json(record))
}

async fn update<E>(
    State(store): State<Store>,
    Id(id): Id,
    Payload(body): Payload,
) -> ApiResult<Json<E>>
where
    E: Entity + Serialize,
{
    let patch = <E::Update as FromJson>::from_json(&body)?;
    let record = blocking(move || store.update::<E>(id, &patch)).await?;
    Ok(Json(record))
}

async fn remove<E>(State(store): State<Store>, Id(id): Id) -> ApiResult<Json<Value>>
where
    E: Entity,
{
    blocking(move || store.delete::<E>(id)).await?;
    Ok(Json(json!({
        "message": format!("{} {} deleted successfully", E::NAME, id),
    })))
}
