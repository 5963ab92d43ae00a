//! Inventory data model
//!
//! Raw records as delivered by the orchestration feed. A snapshot fully
//! replaces the previous one on every refresh cycle; nothing in this module
//! is merged incrementally, so stale partial data can never bleed into a
//! fresh generation.

use serde::{Deserialize, Serialize};

/// Unique identifier for an MCI within the current namespace
pub type MciId = String;
/// Identifier for a VM; unique within its parent MCI, not globally
pub type VmId = String;

/// Fallback label for a VM whose provider or region cannot be resolved
pub const UNKNOWN: &str = "Unknown";

/// A virtual machine as reported by the feed.
///
/// `parent_id` and `mci_status` are stamped during index construction; the
/// wire payload carries `parent_id` only when VMs arrive as a flat list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmRecord {
    pub id: VmId,
    /// Owning MCI id
    pub parent_id: MciId,
    /// Raw status string, passed through untouched (see `status::classify`)
    pub status: String,
    /// Parent MCI's raw status, copied in for contextual filtering only.
    /// Never used for the VM's own classification.
    #[serde(skip)]
    pub mci_status: String,
    /// Explicit provider via the connection config (preferred)
    pub connection_name: Option<String>,
    /// Cloud type from location metadata (provider fallback)
    pub cloud_type: Option<String>,
    /// Explicit region name (preferred)
    pub region: Option<String>,
    /// Region from location metadata (fallback)
    pub native_region: Option<String>,
    pub spec: Option<String>,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl VmRecord {
    /// Resolved provider name: explicit connection first, then the location
    /// cloud type, then the literal fallback.
    pub fn provider(&self) -> &str {
        non_empty(&self.connection_name)
            .or_else(|| non_empty(&self.cloud_type))
            .unwrap_or(UNKNOWN)
    }

    /// Resolved region name, same precedence scheme as `provider`.
    pub fn region_name(&self) -> &str {
        non_empty(&self.region)
            .or_else(|| non_empty(&self.native_region))
            .unwrap_or(UNKNOWN)
    }
}

/// A multi-cloud infrastructure group: a named set of VMs managed as one unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MciRecord {
    pub id: MciId,
    /// Raw status string for the group as a whole
    pub status: String,
    /// Action the orchestrator is currently driving toward (e.g. "Create")
    pub target_action: Option<String>,
    pub description: Option<String>,
    /// Embedded member VMs, in feed order
    pub vms: Vec<VmRecord>,
}

/// One complete inventory refresh.
///
/// `generation` is monotonic; only the highest generation ever drives
/// visible state. When `vms` is present it is the authoritative flat list
/// (each entry carrying its `parent_id`); otherwise members are derived by
/// flattening the embedded per-MCI lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventorySnapshot {
    pub generation: u64,
    pub mcis: Vec<MciRecord>,
    pub vms: Option<Vec<VmRecord>>,
}

impl InventorySnapshot {
    pub fn new(generation: u64, mcis: Vec<MciRecord>) -> Self {
        Self {
            generation,
            mcis,
            vms: None,
        }
    }
}
