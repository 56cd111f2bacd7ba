//! # Item Routes
//!
//! Catalog (menu) management. The home page lists items by category; the
//! items page adds, edits and deletes them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{SubsecRound, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use till_core::validation::{validate_category, validate_item_name, validate_price_cents};
use till_core::{CatalogItem, Money};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    /// Absent or `"all"` means every category.
    pub category: Option<String>,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub name: String,
    /// Minor units.
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    pub category: String,
}

impl ItemInput {
    fn validate(&self) -> ApiResult<()> {
        validate_item_name(&self.name)?;
        validate_price_cents(self.price.cents())?;
        validate_category(&self.category)?;
        Ok(())
    }
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> ApiResult<Json<Vec<CatalogItem>>> {
    let category = filter
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

    debug!(?category, "list_items");
    Ok(Json(state.db.items().list(category).await?))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.db.items().categories().await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CatalogItem>> {
    state
        .db
        .items()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Item", &id))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<ItemInput>,
) -> ApiResult<(StatusCode, Json<CatalogItem>)> {
    input.validate()?;

    let now = Utc::now().trunc_subsecs(6);
    let item = CatalogItem {
        id: Uuid::new_v4().to_string(),
        name: input.name.trim().to_string(),
        price: input.price,
        image: input.image,
        category: input.category.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    state.db.items().insert(&item).await?;

    info!(item_id = %item.id, name = %item.name, "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ItemInput>,
) -> ApiResult<Json<CatalogItem>> {
    input.validate()?;

    let items = state.db.items();
    let mut item = items
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item", &id))?;

    item.name = input.name.trim().to_string();
    item.price = input.price;
    item.image = input.image;
    item.category = input.category.trim().to_string();
    item.updated_at = Utc::now().trunc_subsecs(6);
    items.update(&item).await?;

    info!(item_id = %item.id, "Item updated");
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.db.items().delete(&id).await? {
        return Err(ApiError::not_found("Item", &id));
    }
    info!(item_id = %id, "Item deleted");
    Ok(StatusCode::NO_CONTENT)
}
