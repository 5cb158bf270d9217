// ============================================================================
// Person service library
// ============================================================================
//
// Request flow: handlers -> service -> repository -> PostgreSQL.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod state;

pub use app::build_router;
pub use error::{RepoError, RepoResult};
pub use models::{Person, PersonMask};
pub use repository::{InMemoryPersonRepository, PersonRepository, PgPersonRepository};
pub use service::PersonService;
pub use state::AppState;
