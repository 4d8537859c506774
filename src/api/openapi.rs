//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, inventory, kiosk, sync};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kiosk API",
        version = "1.0.0",
        description = "Offline-first attendance and inventory kiosk REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Kiosk
        kiosk::punch,
        kiosk::link,
        kiosk::verify,
        kiosk::unlink,
        kiosk::list_employees,
        kiosk::today,
        // Inventory
        inventory::create_count,
        inventory::list_products,
        // Sync
        sync::status,
        sync::log,
        sync::sync_now,
        sync::refresh_employees,
    ),
    components(
        schemas(
            health::HealthResponse,
            kiosk::PunchRequest,
            kiosk::LinkRequest,
            kiosk::VerifyResponse,
            kiosk::UnlinkRequest,
            kiosk::UnlinkResponse,
            inventory::CreateCountRequest,
            crate::error::ErrorResponse,
            crate::models::attendance::AttendanceRecord,
            crate::models::attendance::AttendanceStatus,
            crate::models::attendance::PunchAction,
            crate::models::attendance::PunchOutcome,
            crate::models::attendance::TodayRecord,
            crate::models::employee::DeviceBinding,
            crate::models::employee::Employee,
            crate::models::inventory::InventoryCount,
            crate::models::inventory::InventoryCountDetails,
            crate::models::inventory::InventoryCountItem,
            crate::models::inventory::RecordCountItem,
            crate::models::product::Product,
            crate::models::sync::SyncAuditEntry,
            crate::models::sync::SyncStatus,
            crate::services::sync::SyncReport,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "kiosk", description = "Punches and device bindings"),
        (name = "inventory", description = "Offline inventory capture"),
        (name = "sync", description = "Cloud reconciliation")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
