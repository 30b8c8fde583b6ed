//! Careers listing: a case-insensitive filter over a fixed set of mock postings.

use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobPosting {
    pub title: &'static str,
    pub location: &'static str,
    pub id: &'static str,
}

pub const MOCK_POSTINGS: [JobPosting; 3] = [
    JobPosting {
        title: "Software Engineer",
        location: "Redmond, WA",
        id: "12345",
    },
    JobPosting {
        title: "Product Manager",
        location: "San Francisco, CA",
        id: "67890",
    },
    JobPosting {
        title: "Data Scientist",
        location: "New York, NY",
        id: "11223",
    },
];

#[derive(Debug, Default, Deserialize)]
pub struct JobSearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub location: String,
}

/// Keeps postings whose title contains `title_term` and whose location contains
/// `location_term`, ignoring case. Empty terms match everything; surrounding
/// whitespace is part of the term.
pub fn search_postings<'a>(
    postings: &'a [JobPosting],
    title_term: &str,
    location_term: &str,
) -> Vec<&'a JobPosting> {
    let title_term = title_term.to_lowercase();
    let location_term = location_term.to_lowercase();
    postings
        .iter()
        .filter(|job| {
            job.title.to_lowercase().contains(&title_term)
                && job.location.to_lowercase().contains(&location_term)
        })
        .collect()
}

/// GET /api/jobs?q=&location=
pub async fn handle_search_jobs(Query(query): Query<JobSearchQuery>) -> Json<Vec<JobPosting>> {
    let results = search_postings(&MOCK_POSTINGS, &query.q, &query.location)
        .into_iter()
        .copied()
        .collect();
    Json(results)
}
