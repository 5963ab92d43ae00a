//! Focused-MCI selection
//!
//! The master-detail relationship between the MCI table and the VM table.
//! Selection must survive wholesale snapshot replacement without ever
//! pointing at an entity the current generation no longer contains; an MCI
//! deleted by another operator simply clears focus on the next reconcile.

use tokio::sync::broadcast;

use crate::index::InventoryIndex;
use crate::model::{MciId, VmRecord};

/// Emitted whenever the focused MCI changes, so host or sibling views can
/// mirror the same focus without this core depending on them.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusChanged {
    pub focused: Option<MciId>,
}

/// Two-state machine: `Unfocused` (focus is `None`) or `Focused(mci_id)`.
#[derive(Debug, Default)]
pub struct SelectionCoordinator {
    focus: Option<MciId>,
    focus_tx: Option<broadcast::Sender<FocusChanged>>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the mirror channel and return a receiver for it. At most one
    /// channel; calling again replaces it.
    pub fn focus_channel(&mut self, capacity: usize) -> broadcast::Receiver<FocusChanged> {
        let (tx, rx) = broadcast::channel(capacity);
        self.focus_tx = Some(tx);
        rx
    }

    pub fn focused(&self) -> Option<&MciId> {
        self.focus.as_ref()
    }

    /// Focus an MCI. A no-op when the id is absent from the current index;
    /// callers select from rendered rows, which are always current, so a
    /// miss is not an error. Returns whether the id was accepted.
    pub fn select(&mut self, index: &InventoryIndex, id: &str) -> bool {
        if !index.contains_mci(id) {
            return false;
        }
        if self.focus.as_deref() != Some(id) {
            self.focus = Some(id.to_string());
            self.notify();
        }
        true
    }

    pub fn clear(&mut self) {
        if self.focus.take().is_some() {
            self.notify();
        }
    }

    /// Called on every new snapshot. Focus on an id the new generation no
    /// longer contains resets to unfocused; otherwise it is preserved.
    pub fn reconcile(&mut self, index: &InventoryIndex) {
        if let Some(id) = &self.focus {
            if !index.contains_mci(id) {
                self.focus = None;
                self.notify();
            }
        }
    }

    /// The VM view under the current focus: one MCI's members when focused,
    /// the full canonical sequence otherwise.
    pub fn filtered_vms<'a>(&self, index: &'a InventoryIndex) -> &'a [VmRecord] {
        match &self.focus {
            Some(id) => index.vms_of(id),
            None => index.all_vms(),
        }
    }

    fn notify(&self) {
        if let Some(tx) = &self.focus_tx {
            let _ = tx.send(FocusChanged {
                focused: self.focus.clone(),
            });
        }
    }
}
