//! Request handlers.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, header};
use serde::{Deserialize, Serialize};
use tracing::warn;

use orgcal_core::{SourceKind, WindowQuery};
use orgcal_engine::{DeleteScope, SeriesResolver, TimelineEngine, TimelinePage, TimelineRequest};

use crate::auth::{AuthError, AuthProvider, Membership};
use crate::error::{ApiError, ApiResult};
use crate::sync::{SyncClient, SyncDelete};

/// State shared across handlers.
pub struct AppState {
    /// Merges the four sources into timeline pages.
    pub engine: TimelineEngine,
    /// Applies recurrence-scoped deletes.
    pub resolver: SeriesResolver,
    /// Resolves bearer tokens to memberships.
    pub auth: Arc<dyn AuthProvider>,
    /// Receives post-delete notices.
    pub sync: Arc<dyn SyncClient>,
}

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Creates the application state.
    pub fn new(
        engine: TimelineEngine,
        resolver: SeriesResolver,
        auth: Arc<dyn AuthProvider>,
        sync: Arc<dyn SyncClient>,
    ) -> Self {
        Self {
            engine,
            resolver,
            auth,
            sync,
        }
    }
}

/// Query parameters accepted by the timeline read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineParams {
    /// Organization whose timeline is read. Required.
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    /// Window start, RFC 3339. Required.
    pub start: Option<String>,
    /// Window end, RFC 3339. Required.
    pub end: Option<String>,
    /// Comma-separated source tokens; absent selects all sources.
    pub sources: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size.
    pub limit: Option<i64>,
}

/// Query parameters accepted by the series delete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteParams {
    /// Organization the event belongs to. Required.
    #[serde(rename = "orgId")]
    pub org_id: Option<String>,
    /// Delete scope token. Required.
    pub scope: Option<String>,
}

/// Response body for a series delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    /// Every id the delete removed, in series start order.
    pub deleted_ids: Vec<String>,
}

/// Extracts the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Checks that the request carries a token granting active membership
/// in the organization.
async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    organization_id: &str,
) -> ApiResult<Membership> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;

    let membership = state
        .auth
        .membership(token, organization_id)
        .await
        .map_err(|err| match err {
            AuthError::UnknownCredential => ApiError::Unauthorized,
            AuthError::Backend { message } => ApiError::internal(message),
        })?;

    match membership {
        Some(membership) if membership.is_active() => Ok(membership),
        _ => Err(ApiError::forbidden(organization_id)),
    }
}

/// Parses a comma-separated source selection. Unknown tokens are
/// rejected rather than ignored.
fn parse_sources(raw: &str) -> ApiResult<BTreeSet<SourceKind>> {
    let mut selected = BTreeSet::new();
    for token in raw.split(',') {
        let token = token.trim();
        let kind = SourceKind::from_query_token(token)
            .ok_or_else(|| ApiError::bad_request(format!("unknown source: {token}")))?;
        selected.insert(kind);
    }
    Ok(selected)
}

/// `GET /api/v1/timeline` - merged, paginated events for one
/// organization and window.
pub async fn get_timeline(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<TimelineParams>,
) -> ApiResult<Json<TimelinePage>> {
    let organization_id = params
        .org_id
        .ok_or_else(|| ApiError::bad_request("orgId is required"))?;
    let membership = authorize(&state, &headers, &organization_id).await?;

    let mut window = WindowQuery::new(
        params.start.unwrap_or_default(),
        params.end.unwrap_or_default(),
    );
    if let Some(page) = params.page {
        window = window.with_page(page);
    }
    if let Some(limit) = params.limit {
        window = window.with_limit(limit);
    }

    let mut request = TimelineRequest::new(organization_id, membership.user_id, window);
    if let Some(raw) = params.sources.as_deref() {
        request = request.with_sources(parse_sources(raw)?);
    }

    let page = state.engine.timeline(&request).await?;
    Ok(Json(page))
}

/// `DELETE /api/v1/events/{eventId}` - recurrence-scoped delete.
pub async fn delete_event(
    State(state): State<SharedState>,
    Path(event_id): Path<String>,
    headers: HeaderMap,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<DeleteResponse>> {
    let organization_id = params
        .org_id
        .ok_or_else(|| ApiError::bad_request("orgId is required"))?;
    authorize(&state, &headers, &organization_id).await?;

    let scope_token = params
        .scope
        .ok_or_else(|| ApiError::bad_request("scope is required"))?;
    let scope = DeleteScope::from_token(&scope_token)
        .ok_or_else(|| ApiError::bad_request(format!("unknown scope: {scope_token}")))?;

    let deleted_ids = state
        .resolver
        .delete(&organization_id, &event_id, scope)
        .await?;

    // The rows are already gone; a failed push is logged and left behind.
    for id in &deleted_ids {
        let notice = SyncDelete::new(id.clone(), organization_id.clone());
        if let Err(err) = state.sync.push_delete(notice).await {
            warn!(event = %id, error = %err, "sync push failed after delete");
        }
    }

    Ok(Json(DeleteResponse { deleted_ids }))
}

/// `GET /health` - liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod tokens {
        use super::*;

        fn headers_with(value: &str) -> HeaderMap {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, value.parse().unwrap());
            headers
        }

        #[test]
        fn bearer_token_extraction() {
            assert_eq!(
                bearer_token(&headers_with("Bearer tok-alice")),
                Some("tok-alice")
            );
        }

        #[test]
        fn missing_header_is_none() {
            assert_eq!(bearer_token(&HeaderMap::new()), None);
        }

        #[test]
        fn other_schemes_are_rejected() {
            assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwdw==")), None);
            assert_eq!(bearer_token(&headers_with("bearer tok-alice")), None);
        }
    }

    mod sources {
        use super::*;

        #[test]
        fn known_tokens_parse() {
            let selected = parse_sources("events,classes").unwrap();
            assert_eq!(
                selected,
                BTreeSet::from([SourceKind::Event, SourceKind::Class])
            );
        }

        #[test]
        fn whitespace_around_tokens_is_tolerated() {
            let selected = parse_sources("feeds, schedules").unwrap();
            assert_eq!(selected.len(), 2);
        }

        #[test]
        fn unknown_token_is_rejected() {
            let err = parse_sources("events,holidays").unwrap_err();
            assert_eq!(err.code(), "invalid_request");
            assert!(err.to_string().contains("holidays"));
        }

        #[test]
        fn empty_selection_is_rejected() {
            assert!(parse_sources("").is_err());
        }
    }
}
