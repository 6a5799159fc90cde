//! Delete notices for the external calendar sync pipeline.
//!
//! After a series delete commits, one notice per removed event goes out
//! so connected calendars can drop their copies. Delivery is best
//! effort: the rows are already gone, so a failed push is logged by the
//! caller and never retried or rolled back.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use orgcal_store::BoxFuture;

/// A single delete notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDelete {
    /// The deleted event's id.
    pub id: String,
    /// The organization the event belonged to.
    pub organization_id: String,
    /// The operation performed, always `"delete"`.
    pub operation: String,
}

impl SyncDelete {
    /// Creates a delete notice for one event.
    pub fn new(id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            operation: "delete".to_string(),
        }
    }
}

/// Error pushing a notice downstream.
#[derive(Debug, Error)]
#[error("sync push failed: {message}")]
pub struct SyncError {
    message: String,
}

impl SyncError {
    /// Creates a sync error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives delete notices after events are removed.
pub trait SyncClient: Send + Sync {
    /// Pushes one notice to the pipeline.
    fn push_delete<'a>(&'a self, notice: SyncDelete) -> BoxFuture<'a, Result<(), SyncError>>;
}

/// Discards every notice. The default when no pipeline is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSync;

impl SyncClient for NoopSync {
    fn push_delete<'a>(&'a self, _notice: SyncDelete) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async { Ok(()) })
    }
}

/// A sync client that records notices instead of delivering them.
///
/// Public so the dispatch path stays observable from router-level
/// tests, which cannot reach into a handler's state otherwise.
#[derive(Debug, Default)]
pub struct RecordingSync {
    notices: Mutex<Vec<SyncDelete>>,
    fail: bool,
}

impl RecordingSync {
    /// Creates a recorder whose pushes succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder whose pushes fail after recording.
    pub fn failing() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Returns the notices recorded so far, in push order.
    pub async fn recorded(&self) -> Vec<SyncDelete> {
        self.notices.lock().await.clone()
    }
}

impl SyncClient for RecordingSync {
    fn push_delete<'a>(&'a self, notice: SyncDelete) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move {
            self.notices.lock().await.push(notice);
            if self.fail {
                return Err(SyncError::new("recording sink configured to fail"));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_wire_shape() {
        let notice = SyncDelete::new("ev-1", "org-1");
        let value = serde_json::to_value(&notice).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "ev-1",
                "organizationId": "org-1",
                "operation": "delete",
            })
        );
    }

    #[tokio::test]
    async fn recorder_keeps_push_order() {
        let sync = RecordingSync::new();
        sync.push_delete(SyncDelete::new("ev-1", "org-1"))
            .await
            .unwrap();
        sync.push_delete(SyncDelete::new("ev-2", "org-1"))
            .await
            .unwrap();

        let recorded = sync.recorded().await;
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].id, "ev-1");
        assert_eq!(recorded[1].id, "ev-2");
    }

    #[tokio::test]
    async fn failing_recorder_still_records() {
        let sync = RecordingSync::failing();
        let err = sync
            .push_delete(SyncDelete::new("ev-1", "org-1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("sync push failed"));
        assert_eq!(sync.recorded().await.len(), 1);
    }

    #[tokio::test]
    async fn noop_accepts_everything() {
        let sync = NoopSync;
        assert!(sync.push_delete(SyncDelete::new("ev-1", "org-1")).await.is_ok());
    }
}
