//! Feed adapter boundary
//!
//! Adapters are the pluggable backends that deliver inventory snapshots and
//! carry imperative control actions to the orchestration service. The core
//! never talks to the network itself; it consumes whichever adapter the
//! front end wires in. Push delivery is a capability, not a requirement:
//! adapters without it run in pull mode and the dashboard polls.

use async_trait::async_trait;
use std::fmt;
use tokio::sync::broadcast;

use crate::model::InventorySnapshot;

/// Whether a control action targets a whole MCI or a single VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlScope {
    Mci,
    Vm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Resume,
    Suspend,
    Restart,
    Delete,
}

impl ControlAction {
    /// Wire label as the orchestration API spells it
    pub fn label(&self) -> &'static str {
        match self {
            ControlAction::Resume => "resume",
            ControlAction::Suspend => "suspend",
            ControlAction::Restart => "restart",
            ControlAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Errors crossing the feed boundary.
#[derive(Clone, Debug)]
pub enum FeedError {
    /// The backing service could not be reached. Non-fatal: the dashboard
    /// keeps operating on last-good data and flags connectivity as degraded.
    Transport { message: String },
    /// The backend rejected a control action. Surfaced to the operator;
    /// there is no automatic retry.
    Action { message: String },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Transport { message } => write!(f, "feed unreachable: {}", message),
            FeedError::Action { message } => write!(f, "action rejected: {}", message),
        }
    }
}

impl std::error::Error for FeedError {}

/// A backend that supplies inventory snapshots and accepts control actions.
#[async_trait]
pub trait FeedAdapter: Send + Sync {
    /// Human-readable name of this adapter
    fn name(&self) -> &'static str;

    /// Pull one complete snapshot. The adapter owns generation numbering;
    /// each successful fetch must carry a generation above the previous one.
    async fn fetch_snapshot(&self) -> Result<InventorySnapshot, FeedError>;

    /// Push capability: a stream of complete snapshots. Adapters that cannot
    /// push return `None` and the dashboard degrades to pull mode.
    fn subscribe(&self) -> Option<broadcast::Receiver<InventorySnapshot>> {
        None
    }

    /// Fire-and-forget control request. Completion is observed only through
    /// a later snapshot; there is no optimistic local mutation.
    async fn send_control(
        &self,
        scope: ControlScope,
        id: &str,
        action: ControlAction,
    ) -> Result<(), FeedError>;
}
