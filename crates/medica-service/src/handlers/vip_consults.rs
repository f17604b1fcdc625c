//! VIP consult handlers.
//!
//! - `POST /api/v1/vip-consults` - Create a consult and fan it out (VIP members)
//! - `GET /api/v1/me/vip-assignments` - Open assignments of the caller (doctor)

use crate::errors::MedicaError;
use crate::middleware::auth::{require_role, require_vip, subject_id};
use crate::models::{AssignmentListResponse, AssignmentView, ConsultCreatedResponse, NewConsult};
use crate::repositories::{DoctorsRepository, VipConsultsRepository};
use crate::routes::AppState;
use crate::services::attachments::{allowed_file, sanitize_filename};
use crate::services::vip_assignment::MAX_SPECIALTY_CHARS;
use crate::services::VipAssignmentService;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Extension, Json,
};
use bytes::Bytes;
use common::jwt::UserClaims;
use common::types::Role;
use std::sync::Arc;
use tracing::instrument;

/// Parsed consult form. The attachment name is already sanitized.
#[derive(Debug, Default)]
struct ConsultForm {
    description: Option<String>,
    specialty: Option<String>,
    attachment: Option<(String, Bytes)>,
}

/// Sanitized name for an uploaded file, or `None` when the upload should be
/// skipped (no name, nothing left after sanitizing, or a disallowed
/// extension).
fn accepted_attachment_name(file_name: Option<&str>) -> Option<String> {
    let sanitized = sanitize_filename(file_name?)?;
    if allowed_file(&sanitized) {
        Some(sanitized)
    } else {
        tracing::debug!(
            target: "medica.handlers.vip_consults",
            "Ignoring attachment with disallowed extension"
        );
        None
    }
}

/// Trimmed value of a required text field.
fn required_field(value: Option<String>, label: &str) -> Result<String, MedicaError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MedicaError::Validation(format!("Please provide a {label}.")))
}

/// Rejects values longer than the column that stores them.
fn within_limit(value: String, label: &str, max_chars: usize) -> Result<String, MedicaError> {
    if value.chars().count() > max_chars {
        return Err(MedicaError::Validation(format!(
            "The {label} must be at most {max_chars} characters."
        )));
    }
    Ok(value)
}

fn map_multipart_error(err: MultipartError) -> MedicaError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return MedicaError::PayloadTooLarge;
    }
    tracing::debug!(
        target: "medica.handlers.vip_consults",
        error = %err.body_text(),
        "Malformed multipart body"
    );
    MedicaError::Validation("Invalid multipart form".to_string())
}

async fn read_consult_form(mut multipart: Multipart) -> Result<ConsultForm, MedicaError> {
    let mut form = ConsultForm::default();

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("description") => {
                form.description = Some(field.text().await.map_err(map_multipart_error)?);
            }
            Some("specialty") => {
                form.specialty = Some(field.text().await.map_err(map_multipart_error)?);
            }
            Some("file") => {
                let file_name = accepted_attachment_name(field.file_name());
                let contents = field.bytes().await.map_err(map_multipart_error)?;
                if let Some(file_name) = file_name {
                    if !contents.is_empty() {
                        form.attachment = Some((file_name, contents));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Handler for POST /api/v1/vip-consults
///
/// Multipart form with `description`, `specialty` and an optional `file`.
/// The consult is offered to up to 5 doctors rated above 3.0, preferring the
/// requested specialty.
///
/// # Response
///
/// - 201 Created: `{consult_id, status, assigned_doctors}`
/// - 400 Bad Request: Missing description or specialty, or malformed form
/// - 403 Forbidden: Caller is not a VIP member
/// - 413 Payload Too Large: Body exceeds the upload limit
#[instrument(
    skip_all,
    name = "medica.vip_consult.create",
    fields(method = "POST", endpoint = "/api/v1/vip-consults")
)]
pub async fn create_vip_consult(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ConsultCreatedResponse>), MedicaError> {
    require_vip(&claims)?;
    let patient_id = subject_id(&claims)?;

    let multipart = multipart.map_err(|e| {
        tracing::debug!(target: "medica.handlers.vip_consults", error = %e, "Multipart rejected");
        MedicaError::Validation("Invalid multipart form".to_string())
    })?;

    let form = read_consult_form(multipart).await?;
    let description = required_field(form.description, "description")?;
    let specialty = within_limit(
        required_field(form.specialty, "specialty")?,
        "specialty",
        MAX_SPECIALTY_CHARS,
    )?;

    let attachment_path = match form.attachment {
        Some((name, contents)) => Some(state.attachments.save(&name, &contents).await?),
        None => None,
    };

    let created = match VipAssignmentService::create_consult_with_assignments(
        &state.pool,
        patient_id,
        NewConsult {
            description,
            specialty,
            attachment_path: attachment_path.clone(),
        },
    )
    .await
    {
        Ok(created) => created,
        Err(err) => {
            // The consult was rolled back, so nothing references the file.
            if let Some(path) = attachment_path {
                if let Err(cleanup_err) = state.attachments.delete(&path).await {
                    tracing::warn!(
                        target: "medica.handlers.vip_consults",
                        error = %cleanup_err,
                        "Failed to remove orphaned attachment"
                    );
                }
            }
            return Err(err);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(ConsultCreatedResponse {
            consult_id: created.consult.consult_id,
            status: created.consult.status,
            assigned_doctors: created.assigned_doctor_ids.len(),
        }),
    ))
}

/// Handler for GET /api/v1/me/vip-assignments
///
/// Pending and accepted assignments of the caller's doctor profile, newest
/// first.
#[instrument(skip_all, name = "medica.vip_consult.assignments")]
pub async fn list_my_assignments(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<AssignmentListResponse>, MedicaError> {
    require_role(&claims, Role::Doctor)?;
    let user_id = subject_id(&claims)?;

    let doctor = DoctorsRepository::get_by_user_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| MedicaError::NotFound("Doctor profile not found".to_string()))?;

    let assignments = VipConsultsRepository::list_open_for_doctor(&state.pool, doctor.doctor_id)
        .await?
        .into_iter()
        .map(AssignmentView::from)
        .collect();

    Ok(Json(AssignmentListResponse { assignments }))
}
