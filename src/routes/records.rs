//! Handlers for registering and listing victims.
//!
//! Empty names and hospitals are refused before the store is touched.
//! Validation failures and conflicts are ordinary `success: false` replies;
//! only store write failures become error statuses.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::records::{RegistrationError, Snapshot};
use crate::routes::ApiResponse;
use crate::state::AppState;

const EMPTY_NAME: &str = "El nombre no puede estar vacío";
const EMPTY_HOSPITAL: &str = "El hospital no puede estar vacío";
const INVALID_AGE: &str = "La edad no es válida";

#[derive(Debug, Deserialize)]
pub struct DeceasedRequest {
    pub nombre: String,
}

#[derive(Debug, Deserialize)]
pub struct PatientRequest {
    pub nombre: String,
    pub hospital: String,
    #[serde(default)]
    pub edad: Option<i64>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Only positive ages are recorded; anything else means "unknown".
fn normalize_age(edad: Option<i64>) -> Result<Option<u32>, &'static str> {
    match edad {
        Some(age) if age > 0 => u32::try_from(age).map(Some).map_err(|_| INVALID_AGE),
        _ => Ok(None),
    }
}

#[instrument(name = "records::register_deceased_handler", skip(state, payload))]
pub async fn register_deceased(
    State(state): State<AppState>,
    payload: Result<Json<DeceasedRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(req) = payload?;
    if is_blank(&req.nombre) {
        return Ok(Json(ApiResponse::failure(EMPTY_NAME)));
    }

    let response = if state.records.register_deceased(&req.nombre).await? {
        ApiResponse::success(format!("{} ha sido registrado como fallecido", req.nombre))
    } else {
        ApiResponse::failure(format!("{} ya está registrado como fallecido", req.nombre))
    };

    Ok(Json(response))
}

#[instrument(name = "records::register_patient_handler", skip(state, payload))]
pub async fn register_patient(
    State(state): State<AppState>,
    payload: Result<Json<PatientRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(req) = payload?;
    if is_blank(&req.nombre) {
        return Ok(Json(ApiResponse::failure(EMPTY_NAME)));
    }
    if is_blank(&req.hospital) {
        return Ok(Json(ApiResponse::failure(EMPTY_HOSPITAL)));
    }
    let age = match normalize_age(req.edad) {
        Ok(age) => age,
        Err(message) => return Ok(Json(ApiResponse::failure(message))),
    };

    let result = state
        .records
        .register_patient(&req.nombre, &req.hospital, age)
        .await;

    match result {
        Ok(()) => Ok(Json(ApiResponse::success(format!(
            "{} ha sido registrado como paciente en {}",
            req.nombre, req.hospital
        )))),
        Err(conflict @ (RegistrationError::AlreadyPatient { .. } | RegistrationError::AlreadyDeceased)) => {
            Ok(Json(ApiResponse::failure(conflict.to_string())))
        }
        Err(e) => Err(e.into()),
    }
}

/// Full snapshot of both lists.
pub async fn data(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.records.snapshot().await)
}
