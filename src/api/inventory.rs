//! Inventory count and product catalog endpoints

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        inventory::{InventoryCountDetails, RecordCountItem, RecordInventoryCount},
        product::Product,
    },
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCountRequest {
    pub employee_id: i64,
    pub count_date: NaiveDate,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub notes: String,
    pub items: Vec<RecordCountItem>,
}

/// Record an offline inventory count
#[utoipa::path(
    post,
    path = "/inventory-counts",
    tag = "inventory",
    request_body = CreateCountRequest,
    responses(
        (status = 200, description = "Count recorded", body = InventoryCountDetails),
        (status = 400, description = "Invalid count payload"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn create_count(
    State(state): State<AppState>,
    Json(req): Json<CreateCountRequest>,
) -> AppResult<Json<InventoryCountDetails>> {
    let details = state
        .services
        .inventory
        .record_count(
            req.employee_id,
            RecordInventoryCount {
                count_date: req.count_date,
                shift: req.shift,
                branch: req.branch,
                notes: req.notes,
                items: req.items,
            },
        )
        .await?;

    Ok(Json(details))
}

/// Cached product catalog for the counting UI
#[utoipa::path(
    get,
    path = "/products",
    tag = "inventory",
    responses(
        (status = 200, description = "Product catalog", body = [Product])
    )
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = state.services.inventory.products().await?;
    Ok(Json(products))
}
