//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain services.
//!
//! Handlers translate JSON requests into domain calls, map domain types to
//! the DTOs in the `shared` crate and turn domain errors into status codes.
//! Services are injected through the Axum state; the caller's identity comes
//! from the `x-user-id` header on every request.

pub mod rest;
