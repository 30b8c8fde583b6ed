//! The submission workflow behind `POST /api/apply`.
//!
//! 1. store the CV (abort on failure, nothing persisted)
//! 2. insert the record (abort on failure, the stored CV stays orphaned)
//! 3. dispatch notifications (fire-and-forget, never fails the request)
//!
//! Steps 1 and 2 are each bounded by the deadlines in `Config::timeouts`.

use tracing::{info, warn};

use crate::db::PersistenceError;
use crate::errors::AppError;
use crate::models::application::{Applicant, ApplicationRecord};
use crate::state::AppState;
use crate::storage::{object_key, StorageError, UploadedCv};

/// A parsed, file-bearing submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub applicant: Applicant,
    pub cv: UploadedCv,
}

pub async fn submit_application(
    state: &AppState,
    submission: Submission,
) -> Result<ApplicationRecord, AppError> {
    let Submission { applicant, cv } = submission;
    let timeouts = state.config.timeouts;

    // 1. Store file. A failed local write removes its partial file, but a
    // deadline that fires mid-write drops the future and can leave one behind.
    let key = object_key(&cv);
    let cv_location = tokio::time::timeout(timeouts.storage, state.storage.put(&key, &cv))
        .await
        .map_err(|_| StorageError::Timeout(timeouts.storage))??;

    info!(
        "Stored CV ({} bytes) via {} at {}",
        cv.bytes.len(),
        state.storage.backend(),
        cv_location
    );

    // 2. Persist record
    let record = ApplicationRecord::new(applicant, cv_location);
    let inserted = tokio::time::timeout(timeouts.persistence, state.store.insert(&record))
        .await
        .map_err(|_| PersistenceError::Timeout(timeouts.persistence))
        .and_then(|result| result);

    if let Err(e) = inserted {
        // No compensating delete: the file stays where it was written.
        warn!(
            "Record for CV at {} was not saved; file left orphaned",
            record.cv_location
        );
        return Err(e.into());
    }

    info!(
        application_id = %record.id,
        position = %record.position,
        "Application saved"
    );

    // 3. Notify
    state.notifications.dispatch(&record);

    Ok(record)
}
