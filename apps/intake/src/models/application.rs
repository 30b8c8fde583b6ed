use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// The four text fields a candidate submits alongside their CV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Applicant {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
}

/// One persisted submission. Append-only: rows are inserted once and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    /// Address returned by the storage backend: a local path or a public URL.
    pub cv_location: String,
    pub created_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Builds a record for a CV that has already been stored at `cv_location`.
    pub fn new(applicant: Applicant, cv_location: String) -> Self {
        let Applicant {
            name,
            email,
            phone,
            position,
        } = applicant;
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            position,
            cv_location,
            created_at: Utc::now(),
        }
    }

    pub fn applicant(&self) -> Applicant {
        Applicant {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            position: self.position.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_cv_location_in_camel_case() {
        let record = ApplicationRecord::new(
            Applicant {
                name: "Jane Doe".into(),
                email: "jane@x.com".into(),
                phone: "555-1234".into(),
                position: "Engineer".into(),
            },
            "uploads/cv_uploads/cv_1.pdf".into(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["cvLocation"], "uploads/cv_uploads/cv_1.pdf");
        assert_eq!(json["name"], "Jane Doe");
        assert!(json.get("cv_location").is_none());
    }

    #[test]
    fn test_applicant_round_trips_through_record() {
        let applicant = Applicant {
            name: "A".into(),
            email: "a@b.co".into(),
            phone: "1".into(),
            position: "P".into(),
        };
        let record = ApplicationRecord::new(applicant.clone(), "loc".into());
        assert_eq!(record.applicant(), applicant);
    }
}
