use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::intake::workflow::{submit_application, Submission};
use crate::models::application::Applicant;
use crate::state::AppState;
use crate::storage::UploadedCv;

pub const SUBMITTED_MESSAGE: &str = "Application submitted successfully";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub message: String,
    pub cv_url: String,
}

/// POST /api/apply
///
/// Multipart fields `name`, `email`, `phone`, `position` and file `cv`.
/// Returns 201 with the stored CV address once the record is saved.
pub async fn handle_apply(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplyResponse>), AppError> {
    let submission = parse_submission(multipart).await?;
    let record = submit_application(&state, submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            message: SUBMITTED_MESSAGE.to_string(),
            cv_url: record.cv_location,
        }),
    ))
}

/// Reads every part of the body. Text fields that are absent stay empty;
/// a missing or zero-length `cv` part is `AppError::MissingFile`.
async fn parse_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut applicant = Applicant::default();
    let mut cv: Option<UploadedCv> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => applicant.name = field.text().await?,
            "email" => applicant.email = field.text().await?,
            "phone" => applicant.phone = field.text().await?,
            "position" => applicant.position = field.text().await?,
            "cv" => {
                let file_name = field.file_name().map(String::from);
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    cv = Some(UploadedCv {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            other => debug!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    debug!(
        "Parsed submission: name={:?} email={:?} phone={:?} position={:?} cv={:?}",
        applicant.name,
        applicant.email,
        applicant.phone,
        applicant.position,
        cv.as_ref().map(|c| (c.file_name.as_deref(), c.bytes.len()))
    );

    let cv = cv.ok_or(AppError::MissingFile)?;
    Ok(Submission { applicant, cv })
}
