//! API handlers for the kiosk REST endpoints
//!
//! This layer is deliberately thin: validate the request, hand it to a
//! service, shape the response.

pub mod health;
pub mod inventory;
pub mod kiosk;
pub mod openapi;
pub mod sync;
