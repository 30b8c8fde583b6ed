pub mod careers;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod intake;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod storage;

pub use routes::build_router;
pub use state::AppState;
