//! Recurrence-scoped deletion of direct organization events.
//!
//! [`SeriesResolver`] turns one targeted event plus a [`DeleteScope`] into
//! the full set of rows the delete covers, then applies it as a single
//! all-or-nothing soft-delete. The resolved ids are returned so the caller
//! can notify downstream calendar sync for each of them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use orgcal_store::{CalendarStore, StoreError};

use crate::error::{ResolverError, ResolverResult};

/// How far a delete reaches into a recurring series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteScope {
    /// Only the targeted event.
    ThisOnly,
    /// The targeted event and every series member starting on its date
    /// or later.
    ThisAndFuture,
    /// Every member of the series.
    AllInSeries,
}

impl DeleteScope {
    /// Returns the serialized name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThisOnly => "this_only",
            Self::ThisAndFuture => "this_and_future",
            Self::AllInSeries => "all_in_series",
        }
    }

    /// Parses a scope from its query-parameter token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "this_only" => Some(Self::ThisOnly),
            "this_and_future" => Some(Self::ThisAndFuture),
            "all_in_series" => Some(Self::AllInSeries),
            _ => None,
        }
    }
}

impl fmt::Display for DeleteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves delete scopes against recurrence groups and applies them.
pub struct SeriesResolver {
    store: Arc<dyn CalendarStore>,
}

impl SeriesResolver {
    /// Creates a resolver over the given store.
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// Deletes the targeted event under the given scope and returns the
    /// ids of every deleted row, in series start order.
    ///
    /// A target without a recurrence group degrades every scope to a
    /// plain single delete. Partially applied deletes surface as errors,
    /// never as a shortened id list.
    #[tracing::instrument(skip(self), fields(org = %organization_id, event = %event_id))]
    pub async fn delete(
        &self,
        organization_id: &str,
        event_id: &str,
        scope: DeleteScope,
    ) -> ResolverResult<Vec<String>> {
        let target = self
            .store
            .org_event(organization_id, event_id)
            .await?
            .ok_or_else(|| ResolverError::not_found(event_id))?;

        let ids = match (target.recurrence_group_id.as_deref(), scope) {
            (None, _) | (Some(_), DeleteScope::ThisOnly) => vec![target.id.clone()],
            (Some(group_id), DeleteScope::ThisAndFuture) => {
                // Membership is judged on calendar dates, so an earlier
                // occurrence on the target's own date is still covered
                let cutoff = target.start_at.date_naive();
                self.store
                    .events_in_series(organization_id, group_id)
                    .await?
                    .into_iter()
                    .filter(|row| row.start_at.date_naive() >= cutoff)
                    .map(|row| row.id)
                    .collect()
            }
            (Some(group_id), DeleteScope::AllInSeries) => self
                .store
                .events_in_series(organization_id, group_id)
                .await?
                .into_iter()
                .map(|row| row.id)
                .collect(),
        };

        let applied = self.store.soft_delete_events(organization_id, &ids).await?;
        if applied != ids.len() {
            return Err(StoreError::PartialDelete {
                requested: ids.len(),
                applied,
            }
            .into());
        }

        info!(scope = %scope, count = ids.len(), "series delete applied");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use orgcal_store::{MemoryStore, OrgEventRow};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    /// Five weekly occurrences ev-2 .. ev-6 on March 2nd through 6th.
    async fn series_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for day in 2..=6 {
            store
                .insert_event(
                    OrgEventRow::new(
                        format!("ev-{day}"),
                        "org-1",
                        "Study Hours",
                        utc(2026, 3, day, 19, 0, 0),
                    )
                    .with_recurrence_group("grp-1"),
                )
                .await;
        }
        store
    }

    #[test]
    fn scope_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DeleteScope::ThisAndFuture).unwrap(),
            r#""this_and_future""#
        );
        let scope: DeleteScope = serde_json::from_str(r#""all_in_series""#).unwrap();
        assert_eq!(scope, DeleteScope::AllInSeries);
        assert_eq!(DeleteScope::ThisOnly.to_string(), "this_only");
    }

    #[test]
    fn scope_parses_query_tokens() {
        for scope in [
            DeleteScope::ThisOnly,
            DeleteScope::ThisAndFuture,
            DeleteScope::AllInSeries,
        ] {
            assert_eq!(DeleteScope::from_token(scope.as_str()), Some(scope));
        }
        assert_eq!(DeleteScope::from_token("everything"), None);
    }

    #[tokio::test]
    async fn a_lone_event_degrades_every_scope_to_itself() {
        for scope in [
            DeleteScope::ThisOnly,
            DeleteScope::ThisAndFuture,
            DeleteScope::AllInSeries,
        ] {
            let store = Arc::new(MemoryStore::new());
            store
                .insert_event(OrgEventRow::new("ev-1", "org-1", "One-off", utc(2026, 3, 2, 19, 0, 0)))
                .await;

            let resolver = SeriesResolver::new(store);
            let ids = resolver.delete("org-1", "ev-1", scope).await.unwrap();
            assert_eq!(ids, vec!["ev-1"], "scope {scope}");
        }
    }

    #[tokio::test]
    async fn this_only_spares_the_rest_of_the_series() {
        let store = series_store().await;
        let resolver = SeriesResolver::new(Arc::clone(&store) as Arc<dyn CalendarStore>);

        let ids = resolver
            .delete("org-1", "ev-4", DeleteScope::ThisOnly)
            .await
            .unwrap();
        assert_eq!(ids, vec!["ev-4"]);

        let remaining = store.events_in_series("org-1", "grp-1").await.unwrap();
        assert_eq!(remaining.len(), 4);
    }

    #[tokio::test]
    async fn this_and_future_cuts_the_series_at_the_target_date() {
        let store = series_store().await;
        let resolver = SeriesResolver::new(Arc::clone(&store) as Arc<dyn CalendarStore>);

        let ids = resolver
            .delete("org-1", "ev-4", DeleteScope::ThisAndFuture)
            .await
            .unwrap();
        assert_eq!(ids, vec!["ev-4", "ev-5", "ev-6"]);

        let remaining = store.events_in_series("org-1", "grp-1").await.unwrap();
        let left: Vec<&str> = remaining.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(left, vec!["ev-2", "ev-3"]);
    }

    #[tokio::test]
    async fn this_and_future_includes_same_date_earlier_occurrences() {
        let store = series_store().await;
        // an extra occurrence earlier on ev-4's own date
        store
            .insert_event(
                OrgEventRow::new("ev-4b", "org-1", "Study Hours", utc(2026, 3, 4, 8, 0, 0))
                    .with_recurrence_group("grp-1"),
            )
            .await;
        let resolver = SeriesResolver::new(store);

        let ids = resolver
            .delete("org-1", "ev-4", DeleteScope::ThisAndFuture)
            .await
            .unwrap();
        assert_eq!(ids, vec!["ev-4b", "ev-4", "ev-5", "ev-6"]);
    }

    #[tokio::test]
    async fn all_in_series_deletes_everything_from_any_target() {
        let store = series_store().await;
        let resolver = SeriesResolver::new(Arc::clone(&store) as Arc<dyn CalendarStore>);

        let ids = resolver
            .delete("org-1", "ev-6", DeleteScope::AllInSeries)
            .await
            .unwrap();
        assert_eq!(ids, vec!["ev-2", "ev-3", "ev-4", "ev-5", "ev-6"]);

        assert!(store.events_in_series("org-1", "grp-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn an_unknown_target_is_not_found() {
        let resolver = SeriesResolver::new(series_store().await);
        let err = resolver
            .delete("org-1", "ev-99", DeleteScope::ThisOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::NotFound { .. }));
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn a_deleted_target_is_not_found_on_the_second_call() {
        let resolver = SeriesResolver::new(series_store().await);
        resolver
            .delete("org-1", "ev-4", DeleteScope::ThisOnly)
            .await
            .unwrap();

        let err = resolver
            .delete("org-1", "ev-4", DeleteScope::ThisOnly)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn deletes_are_scoped_to_the_organization() {
        let store = series_store().await;
        store
            .insert_event(OrgEventRow::new("ev-foreign", "org-2", "Other", utc(2026, 3, 2, 19, 0, 0)))
            .await;
        let resolver = SeriesResolver::new(store);

        let err = resolver
            .delete("org-1", "ev-foreign", DeleteScope::ThisOnly)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }
}
