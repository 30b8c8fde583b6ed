// Application intake: multipart parsing, then store file -> persist record -> notify.
// Ordering is strict and there are no back-edges; see workflow.rs.

pub mod handlers;
pub mod workflow;
