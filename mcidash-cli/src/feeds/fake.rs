//! Simulated orchestration feed
//!
//! Synthesizes a small multi-provider fleet whose statuses drift from tick
//! to tick: a batch group walks through Creating(k/n) into Running, an edge
//! group flaps between Running and Partial-Failed, and a legacy group sits
//! suspended. Useful for demos and for exercising the dashboard without a
//! backing service.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use mcidash_core::feed::{ControlAction, ControlScope, FeedAdapter, FeedError};
use mcidash_core::model::{InventorySnapshot, MciRecord, VmRecord};

/// Namespace holding the synthesized demo fleet; any other namespace
/// resolves to an empty inventory, the same way a real scoped API query
/// would.
const DEMO_NAMESPACE: &str = "default";

pub struct FakeFeed {
    namespace: String,
    generation: AtomicU64,
}

impl FakeFeed {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            generation: AtomicU64::new(0),
        }
    }

    fn vm(id: &str, conn: &str, cloud: &str, region: &str, status: &str) -> VmRecord {
        VmRecord {
            id: id.into(),
            status: status.into(),
            connection_name: Some(conn.into()),
            cloud_type: Some(cloud.into()),
            region: Some(region.into()),
            spec: Some("t3.medium".into()),
            public_ip: Some("203.0.113.10".into()),
            private_ip: Some("10.0.0.10".into()),
            ..Default::default()
        }
    }

    fn snapshot_at(generation: u64) -> InventorySnapshot {
        // batch walks Creating(1/3)..Creating(3/3) then settles on Running
        let batch_status = if generation < 4 {
            format!("Creating({}/3)", generation.min(3))
        } else {
            "Running".to_string()
        };
        let batch_vm_status = if generation < 4 { "Creating" } else { "Running" };

        // edge flaps into Partial-Failed every third generation
        let edge_status = if generation % 3 == 0 {
            "Partial-Failed"
        } else {
            "Running"
        };

        let mcis = vec![
            MciRecord {
                id: "web-fleet".into(),
                status: "Running".into(),
                target_action: Some("None".into()),
                description: Some("frontend fleet".into()),
                vms: vec![
                    Self::vm("web-1", "aws-east", "aws", "us-east-1", "Running"),
                    Self::vm("web-2", "aws-west", "aws", "us-west-2", "Running"),
                    Self::vm("web-3", "gcp-eu", "gcp", "europe-west1", "Running"),
                ],
            },
            MciRecord {
                id: "batch".into(),
                status: batch_status,
                target_action: Some("Create".into()),
                description: Some("nightly batch workers".into()),
                vms: vec![
                    Self::vm("batch-1", "azure-kr", "azure", "koreacentral", batch_vm_status),
                    Self::vm("batch-2", "azure-kr", "azure", "koreacentral", batch_vm_status),
                ],
            },
            MciRecord {
                id: "edge".into(),
                status: edge_status.into(),
                target_action: None,
                description: Some("edge relays".into()),
                vms: vec![
                    Self::vm("edge-1", "gcp-eu", "gcp", "europe-west1", "Running"),
                    Self::vm(
                        "edge-2",
                        "aws-east",
                        "aws",
                        "us-east-1",
                        if generation % 3 == 0 { "Failed" } else { "Running" },
                    ),
                ],
            },
            MciRecord {
                id: "legacy".into(),
                status: "Suspended".into(),
                target_action: None,
                description: Some("retired stack, kept for audit".into()),
                vms: vec![Self::vm("legacy-1", "aws-east", "aws", "us-east-1", "Suspended")],
            },
        ];

        InventorySnapshot::new(generation, mcis)
    }
}

impl Default for FakeFeed {
    fn default() -> Self {
        Self::new(DEMO_NAMESPACE)
    }
}

#[async_trait]
impl FeedAdapter for FakeFeed {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_snapshot(&self) -> Result<InventorySnapshot, FeedError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if self.namespace != DEMO_NAMESPACE {
            return Ok(InventorySnapshot::new(generation, Vec::new()));
        }
        Ok(Self::snapshot_at(generation))
    }

    async fn send_control(
        &self,
        _scope: ControlScope,
        id: &str,
        action: ControlAction,
    ) -> Result<(), FeedError> {
        if self.namespace != DEMO_NAMESPACE {
            return Err(FeedError::Action {
                message: format!("{} not found in namespace {}", id, self.namespace),
            });
        }
        // The demo backend rejects resume on anything that isn't suspended,
        // which is enough to exercise the action-failure path.
        if action == ControlAction::Resume && id != "legacy" {
            return Err(FeedError::Action {
                message: format!("{} is not suspended", id),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generations_are_monotonic() {
        let feed = FakeFeed::new(DEMO_NAMESPACE);
        let a = feed.fetch_snapshot().await.unwrap();
        let b = feed.fetch_snapshot().await.unwrap();
        assert!(b.generation > a.generation);
    }

    #[tokio::test]
    async fn test_other_namespace_is_empty() {
        let feed = FakeFeed::new("staging");
        let snap = feed.fetch_snapshot().await.unwrap();
        assert!(snap.mcis.is_empty());
        assert_eq!(snap.generation, 1);

        let result = feed
            .send_control(ControlScope::Mci, "legacy", ControlAction::Resume)
            .await;
        assert!(matches!(result, Err(FeedError::Action { .. })));
    }

    #[tokio::test]
    async fn test_batch_settles_on_running() {
        let feed = FakeFeed::new(DEMO_NAMESPACE);
        let mut last = feed.fetch_snapshot().await.unwrap();
        for _ in 0..5 {
            last = feed.fetch_snapshot().await.unwrap();
        }
        let batch = last.mcis.iter().find(|m| m.id == "batch").unwrap();
        assert_eq!(batch.status, "Running");
    }

    #[tokio::test]
    async fn test_resume_rejected_for_running_mci() {
        let feed = FakeFeed::new(DEMO_NAMESPACE);
        let result = feed
            .send_control(ControlScope::Mci, "web-fleet", ControlAction::Resume)
            .await;
        assert!(matches!(result, Err(FeedError::Action { .. })));

        let result = feed
            .send_control(ControlScope::Mci, "legacy", ControlAction::Resume)
            .await;
        assert!(result.is_ok());
    }
}
