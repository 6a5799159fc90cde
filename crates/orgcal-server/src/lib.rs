//! HTTP server for the merged organization timeline.
//!
//! Exposes three endpoints:
//! - `GET /health` - liveness probe
//! - `GET /api/v1/timeline` - merged, paginated events for one organization
//! - `DELETE /api/v1/events/{eventId}` - recurrence-scoped delete
//!
//! Every `/api/v1` request names an organization through the `orgId`
//! query parameter and carries a bearer token; the token must resolve
//! to an active membership in that organization.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use orgcal_engine::{SeriesResolver, TimelineEngine};
//! use orgcal_server::{AppState, NoopSync, ServerConfig, StaticAuth, build_router};
//! use orgcal_store::{CalendarStore, MemoryStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn CalendarStore> = Arc::new(MemoryStore::new());
//! let state = Arc::new(AppState::new(
//!     TimelineEngine::for_store(store.clone(), chrono::Utc),
//!     SeriesResolver::new(store),
//!     Arc::new(StaticAuth::new()),
//!     Arc::new(NoopSync),
//! ));
//!
//! let config = ServerConfig::default();
//! let router = build_router(state, &config);
//! let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod error;
mod handlers;
mod routes;
mod seed;
mod sync;

pub use auth::{AuthError, AuthProvider, MemberRole, Membership, MembershipStatus, StaticAuth};
pub use config::{ServerConfig, default_bind_addr};
pub use error::{ApiError, ApiResult};
pub use handlers::{AppState, DeleteParams, DeleteResponse, SharedState, TimelineParams};
pub use routes::build_router;
pub use seed::{SeedError, SeedFile, SeedIdentity, SeedMembership};
pub use sync::{NoopSync, RecordingSync, SyncClient, SyncDelete, SyncError};
