//! Punch and device-binding endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        attendance::{PunchOutcome, TodayRecord},
        employee::{DeviceBinding, Employee},
    },
    services::attendance::PunchAuth,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PunchRequest {
    pub employee_id: i64,
    /// Device claiming an existing binding
    pub device_id: Option<String>,
    /// Raw PIN claim, checked when no binding applies
    pub pin: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LinkRequest {
    pub employee_id: i64,
    #[validate(length(min = 4, message = "PIN must be at least 4 characters"))]
    pub pin: String,
    #[validate(length(min = 1, message = "device_id must not be empty"))]
    pub device_id: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct VerifyQuery {
    pub employee_id: i64,
    pub device_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub verified: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnlinkRequest {
    pub employee_id: i64,
    pub admin_pin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnlinkResponse {
    pub success: bool,
}

/// Record a check-in or check-out punch
#[utoipa::path(
    post,
    path = "/kiosk/punch",
    tag = "kiosk",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Punch recorded", body = PunchOutcome),
        (status = 401, description = "Not authorized for this employee"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn punch(
    State(state): State<AppState>,
    Json(req): Json<PunchRequest>,
) -> AppResult<Json<PunchOutcome>> {
    // Device binding first, PIN claim as the fallback
    let auth = match (req.device_id, req.pin) {
        (Some(device_id), Some(pin)) => {
            if state
                .services
                .device
                .verify(req.employee_id, &device_id)
                .await?
            {
                PunchAuth::Device(device_id)
            } else {
                PunchAuth::Pin(pin)
            }
        }
        (Some(device_id), None) => PunchAuth::Device(device_id),
        (None, Some(pin)) => PunchAuth::Pin(pin),
        (None, None) => {
            return Err(AppError::Unauthorized(
                "a device id or PIN is required".to_string(),
            ))
        }
    };

    let outcome = state
        .services
        .attendance
        .punch(req.employee_id, auth, Local::now().naive_local())
        .await?;

    Ok(Json(outcome))
}

/// Bind this device to an employee after a PIN claim
#[utoipa::path(
    post,
    path = "/kiosk/link",
    tag = "kiosk",
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Device linked", body = DeviceBinding),
        (status = 401, description = "PIN mismatch"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee already bound to another device")
    )
)]
pub async fn link(
    State(state): State<AppState>,
    Json(req): Json<LinkRequest>,
) -> AppResult<Json<DeviceBinding>> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let binding = state
        .services
        .device
        .link(req.employee_id, &req.pin, &req.device_id)
        .await?;

    Ok(Json(binding))
}

/// Check whether this device is authorized for an employee
#[utoipa::path(
    get,
    path = "/kiosk/verify",
    tag = "kiosk",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse)
    )
)]
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<VerifyResponse>> {
    let verified = state
        .services
        .device
        .verify(query.employee_id, &query.device_id)
        .await?;

    Ok(Json(VerifyResponse { verified }))
}

/// Clear an employee's device binding (administrator only)
#[utoipa::path(
    post,
    path = "/kiosk/unlink",
    tag = "kiosk",
    request_body = UnlinkRequest,
    responses(
        (status = 200, description = "Binding cleared", body = UnlinkResponse),
        (status = 401, description = "Admin PIN rejected"),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn unlink(
    State(state): State<AppState>,
    Json(req): Json<UnlinkRequest>,
) -> AppResult<Json<UnlinkResponse>> {
    state
        .services
        .device
        .unlink(req.employee_id, &req.admin_pin)
        .await?;

    Ok(Json(UnlinkResponse { success: true }))
}

/// Active employee roster for the kiosk UI
#[utoipa::path(
    get,
    path = "/employees",
    tag = "kiosk",
    responses(
        (status = 200, description = "Active employees", body = [Employee])
    )
)]
pub async fn list_employees(State(state): State<AppState>) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.services.attendance.roster().await?;
    Ok(Json(employees))
}

/// Today's attendance records, joined with employee names
#[utoipa::path(
    get,
    path = "/attendance/today",
    tag = "kiosk",
    responses(
        (status = 200, description = "Today's records", body = [TodayRecord])
    )
)]
pub async fn today(State(state): State<AppState>) -> AppResult<Json<Vec<TodayRecord>>> {
    let records = state
        .services
        .attendance
        .today(Local::now().naive_local())
        .await?;

    Ok(Json(records))
}
