//! HTTP Controller - axum routes for the pets API

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use kennel_domain::PetId;
use kennel_usecase::{DynPetService, PageSelector};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use super::dto::{ListQuery, Paginated, PetBody};
use super::error::ApiError;
use super::validation::{parse_new_pet, parse_pet_patch};

type ApiResult<T> = Result<T, ApiError>;

/// Shared handler state
///
/// All writes go through the one mutex, so a get-or-create on a group or
/// trait name cannot interleave with another request's.
#[derive(Clone)]
pub struct AppState {
    service: Arc<Mutex<DynPetService>>,
    collection_url: Arc<Url>,
}

impl AppState {
    /// `public_url` is the externally visible base, e.g. `http://localhost:8000`
    pub fn new(service: DynPetService, public_url: &str) -> Result<Self, url::ParseError> {
        let collection_url = Url::parse(&format!("{}/pets", public_url.trim_end_matches('/')))?;
        Ok(Self {
            service: Arc::new(Mutex::new(service)),
            collection_url: Arc::new(collection_url),
        })
    }

    /// Run `f` against the locked service on the blocking pool
    ///
    /// Repository calls may hit SQLite, so they stay off the async workers.
    async fn run<R, F>(&self, f: F) -> ApiResult<R>
    where
        F: FnOnce(&mut DynPetService) -> ApiResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let mut service = Arc::clone(&self.service).lock_owned().await;
        tokio::task::spawn_blocking(move || f(&mut *service))
            .await
            .map_err(|e| ApiError::Internal(format!("service task failed: {e}")))?
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/pets", get(list_pets).post(create_pet))
        .route(
            "/pets/{id}",
            get(get_pet).patch(patch_pet).delete(delete_pet),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_pets(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Paginated<PetBody>>> {
    let Query(query) = query?;
    let selector =
        PageSelector::parse(query.page.as_deref()).map_err(|_| ApiError::invalid_page())?;
    // `?trait=` with no value means no filter
    let trait_name = query.trait_name.filter(|name| !name.is_empty());

    let filter = trait_name.clone();
    let page = state
        .run(move |service| Ok(service.list_pets(filter.as_deref(), selector)?))
        .await?;
    Ok(Json(Paginated::from_page(
        page.map(PetBody::from),
        &state.collection_url,
        trait_name.as_deref(),
    )))
}

async fn create_pet(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let new_pet = parse_new_pet(&body)?;

    let details = state
        .run(move |service| Ok(service.create_pet(new_pet)?))
        .await?;
    Ok((StatusCode::CREATED, Json(PetBody::from(details))))
}

async fn get_pet(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<PetBody>> {
    let id = parse_id(&raw_id)?;
    let details = state.run(move |service| Ok(service.get_pet(id)?)).await?;
    Ok(Json(PetBody::from(details)))
}

/// The pet is looked up before the body is read, so a missing pet is 404
/// whatever the body holds.
async fn patch_pet(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PetBody>> {
    let id = parse_id(&raw_id)?;

    let details = state
        .run(move |service| {
            service.ensure_exists(id)?;
            let Json(body) = body?;
            let patch = parse_pet_patch(&body)?;
            Ok(service.patch_pet(id, patch)?)
        })
        .await?;
    Ok(Json(PetBody::from(details)))
}

async fn delete_pet(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    state.run(move |service| Ok(service.delete_pet(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ids are positive integers; anything else names no pet
fn parse_id(raw: &str) -> ApiResult<PetId> {
    raw.parse::<u64>().map(PetId::new).map_err(|_| {
        debug!(raw, "non-numeric pet id");
        ApiError::not_found()
    })
}
