//! Refresh orchestrator
//!
//! Owns the rebuild pipeline: index -> reconcile selection -> aggregate ->
//! publish. One logical refresh runs synchronously to completion; a
//! non-reentrancy flag guards against a change-notification callback
//! re-entering `apply_snapshot` mid-rebuild. Only the highest-generation
//! snapshot ever drives visible state, and failures local to one snapshot
//! never block the next.

use tokio::sync::broadcast;

use crate::aggregate::{FleetAggregates, aggregate};
use crate::feed::FeedError;
use crate::index::InventoryIndex;
use crate::model::{InventorySnapshot, MciId};
use crate::selection::{FocusChanged, SelectionCoordinator};
use crate::view::{DashboardView, publish};

/// Result of offering a snapshot to the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    Applied { generation: u64 },
    /// At or below the committed generation; dropped without touching state
    StaleDiscarded { generation: u64 },
    /// A rebuild is already in flight; the caller retries on its next tick
    InFlight,
}

/// Result of reporting a control-action outcome back to the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    /// Accepted by the backend; the effect shows up in a later snapshot
    Accepted,
    /// Rejected or unreachable; surfaced through the view model
    Failed,
    /// A newer snapshot already committed; the outcome is ignored
    StaleDiscarded,
}

pub struct Dashboard {
    index: InventoryIndex,
    aggregates: FleetAggregates,
    selection: SelectionCoordinator,
    view: DashboardView,
    committed_generation: Option<u64>,
    rebuilding: bool,
    connectivity_degraded: bool,
    last_transport_error: Option<String>,
    last_action_error: Option<String>,
    change_tx: broadcast::Sender<u64>,
}

impl Dashboard {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(16);
        let index = InventoryIndex::default();
        let aggregates = FleetAggregates::default();
        let selection = SelectionCoordinator::new();
        let view = publish(&index, &aggregates, &selection);
        Self {
            index,
            aggregates,
            selection,
            view,
            committed_generation: None,
            rebuilding: false,
            connectivity_degraded: false,
            last_transport_error: None,
            last_action_error: None,
            change_tx,
        }
    }

    /// Fired once per completed rebuild (and once per selection change),
    /// carrying the committed generation.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<u64> {
        self.change_tx.subscribe()
    }

    /// Focus mirror for host/sibling views; see `SelectionCoordinator`.
    pub fn subscribe_focus(&mut self) -> broadcast::Receiver<FocusChanged> {
        self.selection.focus_channel(16)
    }

    /// Offer one snapshot. Stale generations are discarded, never merged;
    /// an applied snapshot replaces all derived state wholesale.
    pub fn apply_snapshot(&mut self, snapshot: &InventorySnapshot) -> RebuildOutcome {
        if self.rebuilding {
            return RebuildOutcome::InFlight;
        }
        if let Some(committed) = self.committed_generation {
            if snapshot.generation <= committed {
                return RebuildOutcome::StaleDiscarded {
                    generation: snapshot.generation,
                };
            }
        }

        self.rebuilding = true;
        let index = InventoryIndex::build(snapshot);
        self.selection.reconcile(&index);
        let aggregates = aggregate(&index);
        let view = publish(&index, &aggregates, &self.selection);

        self.index = index;
        self.aggregates = aggregates;
        self.view = view;
        self.committed_generation = Some(snapshot.generation);
        // a good snapshot ends the degraded condition
        self.connectivity_degraded = false;
        self.last_transport_error = None;
        self.stamp_indicators();
        self.rebuilding = false;

        let _ = self.change_tx.send(snapshot.generation);
        RebuildOutcome::Applied {
            generation: snapshot.generation,
        }
    }

    /// Focus an MCI from the current generation; unknown ids are a no-op.
    pub fn select(&mut self, id: &str) {
        if self.selection.select(&self.index, id) {
            self.republish();
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection.focused().is_some() {
            self.selection.clear();
            self.republish();
        }
    }

    /// Report the outcome of a control action that was sent while
    /// `sent_at_generation` was committed. An outcome older than the current
    /// generation is discarded: the newer snapshot already reflects (or
    /// supersedes) whatever the action did.
    pub fn record_control_outcome(
        &mut self,
        sent_at_generation: u64,
        outcome: Result<(), FeedError>,
    ) -> ControlOutcome {
        if sent_at_generation < self.generation() {
            return ControlOutcome::StaleDiscarded;
        }
        match outcome {
            Ok(()) => ControlOutcome::Accepted,
            Err(FeedError::Action { message }) => {
                self.last_action_error = Some(message);
                self.stamp_indicators();
                ControlOutcome::Failed
            }
            Err(FeedError::Transport { message }) => {
                self.note_transport_failure(&message);
                ControlOutcome::Failed
            }
        }
    }

    /// Flag connectivity as degraded without touching the committed view;
    /// rows keep showing last-good data.
    pub fn note_transport_failure(&mut self, message: &str) {
        self.connectivity_degraded = true;
        self.last_transport_error = Some(message.to_string());
        self.stamp_indicators();
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn generation(&self) -> u64 {
        self.committed_generation.unwrap_or(0)
    }

    pub fn focused_mci(&self) -> Option<&MciId> {
        self.selection.focused()
    }

    pub fn connectivity_degraded(&self) -> bool {
        self.connectivity_degraded
    }

    pub fn last_transport_error(&self) -> Option<&str> {
        self.last_transport_error.as_deref()
    }

    fn republish(&mut self) {
        self.view = publish(&self.index, &self.aggregates, &self.selection);
        self.stamp_indicators();
        let _ = self.change_tx.send(self.generation());
    }

    fn stamp_indicators(&mut self) {
        self.view.connectivity_degraded = self.connectivity_degraded;
        self.view.last_action_error = self.last_action_error.clone();
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
