//! Render-ready view model
//!
//! The pure data contract handed to the rendering layer. Rows carry both the
//! raw status string and its canonical bucket: action enablement needs
//! exact-match semantics on the raw value, while badges and charts work on
//! the canonical one.

use serde::Serialize;

use crate::aggregate::FleetAggregates;
use crate::index::InventoryIndex;
use crate::model::{MciId, VmId, VmRecord};
use crate::selection::SelectionCoordinator;
use crate::status::{CanonicalStatus, classify};

/// Which control buttons are enabled for a row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ActionFlags {
    pub resume: bool,
    pub suspend: bool,
    pub restart: bool,
    pub delete: bool,
}

impl ActionFlags {
    /// Exact-match policy on the trimmed raw status. Canonical buckets are
    /// too coarse here: "Creating(3/5)" classifies as Creating but must not
    /// enable anything except delete.
    pub fn for_raw_status(raw: &str) -> Self {
        let s = raw.trim();
        ActionFlags {
            resume: matches!(s, "Suspended" | "Failed" | "Partial-Failed"),
            suspend: s == "Running",
            restart: s == "Running",
            delete: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MciRow {
    pub id: MciId,
    pub raw_status: String,
    pub status: CanonicalStatus,
    pub target_action: Option<String>,
    pub description: Option<String>,
    /// Comma-joined distinct provider set across member VMs
    pub providers: String,
    pub vm_count: usize,
    pub actions: ActionFlags,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmRow {
    pub id: VmId,
    pub parent_id: MciId,
    pub raw_status: String,
    pub status: CanonicalStatus,
    pub provider: String,
    pub region: String,
    pub spec: Option<String>,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub actions: ActionFlags,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCount {
    pub region: String,
    pub count: u64,
}

/// One stacked-chart series: a provider and its per-region VM counts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSeries {
    pub provider: String,
    pub points: Vec<RegionCount>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// Fixed canonical label sequence; the series below align with it
    pub status_labels: Vec<&'static str>,
    pub mci_status_series: Vec<u64>,
    pub vm_status_series: Vec<u64>,
    pub provider_region_series: Vec<ProviderSeries>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Badges {
    pub mci_total: u64,
    pub vm_total: u64,
    pub running_vms: u64,
    pub failed_vms: u64,
    pub distinct_providers: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub focused_mci_id: Option<MciId>,
    /// Header text for the VM detail table
    pub header: String,
}

/// The complete external-facing payload for one rebuild.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub generation: u64,
    pub mci_rows: Vec<MciRow>,
    pub vm_rows: Vec<VmRow>,
    pub charts: ChartData,
    pub badges: Badges,
    pub selection: SelectionView,
    /// The feed could not be reached; rows show last-good data
    pub connectivity_degraded: bool,
    /// Message from the most recent rejected control action, if any
    pub last_action_error: Option<String>,
}

fn vm_row(vm: &VmRecord) -> VmRow {
    VmRow {
        id: vm.id.clone(),
        parent_id: vm.parent_id.clone(),
        raw_status: vm.status.clone(),
        status: classify(&vm.status),
        provider: vm.provider().to_string(),
        region: vm.region_name().to_string(),
        spec: vm.spec.clone(),
        public_ip: vm.public_ip.clone(),
        private_ip: vm.private_ip.clone(),
        actions: ActionFlags::for_raw_status(&vm.status),
    }
}

/// Assemble the view model for one (index, aggregates, selection) triple.
/// Pure: calling twice with the same inputs yields an identical payload.
pub fn publish(
    index: &InventoryIndex,
    aggregates: &FleetAggregates,
    selection: &SelectionCoordinator,
) -> DashboardView {
    let mci_rows = index
        .mcis()
        .iter()
        .map(|m| MciRow {
            id: m.id.clone(),
            raw_status: m.status.clone(),
            status: classify(&m.status),
            target_action: m.target_action.clone(),
            description: m.description.clone(),
            providers: index.provider_set(&m.id).join(", "),
            vm_count: index.vms_of(&m.id).len(),
            actions: ActionFlags::for_raw_status(&m.status),
        })
        .collect();

    let vm_rows = selection.filtered_vms(index).iter().map(vm_row).collect();

    let charts = ChartData {
        status_labels: CanonicalStatus::ALL.iter().map(|s| s.label()).collect(),
        mci_status_series: CanonicalStatus::ALL
            .iter()
            .map(|&s| aggregates.mci_counts.get(s))
            .collect(),
        vm_status_series: CanonicalStatus::ALL
            .iter()
            .map(|&s| aggregates.vm_counts.get(s))
            .collect(),
        provider_region_series: aggregates
            .provider_region
            .iter()
            .map(|(provider, regions)| ProviderSeries {
                provider: provider.clone(),
                points: regions
                    .iter()
                    .map(|(region, &count)| RegionCount {
                        region: region.clone(),
                        count,
                    })
                    .collect(),
            })
            .collect(),
    };

    let badges = Badges {
        mci_total: aggregates.mci_counts.total(),
        vm_total: aggregates.vm_counts.total(),
        running_vms: aggregates.vm_counts.get(CanonicalStatus::Running),
        failed_vms: aggregates.vm_counts.get(CanonicalStatus::Failed),
        distinct_providers: aggregates.distinct_provider_count,
    };

    let selection_view = match selection.focused() {
        Some(id) => SelectionView {
            focused_mci_id: Some(id.clone()),
            header: format!("{} ({} VMs)", id, index.vms_of(id).len()),
        },
        None => SelectionView {
            focused_mci_id: None,
            header: format!("All VMs ({})", index.all_vms().len()),
        },
    };

    DashboardView {
        generation: index.generation(),
        mci_rows,
        vm_rows,
        charts,
        badges,
        selection: selection_view,
        connectivity_degraded: false,
        last_action_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::{InventorySnapshot, MciRecord, VmRecord};

    fn vm(id: &str, conn: &str, region: &str, status: &str) -> VmRecord {
        VmRecord {
            id: id.into(),
            status: status.into(),
            connection_name: Some(conn.into()),
            region: Some(region.into()),
            ..Default::default()
        }
    }

    fn sample_snapshot() -> InventorySnapshot {
        InventorySnapshot::new(
            9,
            vec![
                MciRecord {
                    id: "web".into(),
                    status: "Running".into(),
                    target_action: Some("None".into()),
                    vms: vec![
                        vm("w1", "aws", "us-east", "Running"),
                        vm("w2", "gcp", "eu", "Running"),
                    ],
                    ..Default::default()
                },
                MciRecord {
                    id: "batch".into(),
                    status: "Suspended".into(),
                    vms: vec![vm("b1", "aws", "us-west", "Suspended")],
                    ..Default::default()
                },
            ],
        )
    }

    fn build_view(selection: &SelectionCoordinator) -> DashboardView {
        let index = InventoryIndex::build(&sample_snapshot());
        let agg = aggregate(&index);
        publish(&index, &agg, selection)
    }

    #[test]
    fn test_action_flags_exact_raw_match() {
        assert_eq!(
            ActionFlags::for_raw_status("Running"),
            ActionFlags {
                resume: false,
                suspend: true,
                restart: true,
                delete: true
            }
        );
        assert_eq!(
            ActionFlags::for_raw_status("Suspended"),
            ActionFlags {
                resume: true,
                suspend: false,
                restart: false,
                delete: true
            }
        );
        assert!(ActionFlags::for_raw_status("Partial-Failed").resume);
        assert!(ActionFlags::for_raw_status("Failed").resume);

        // canonical Creating, but no exact match: delete only
        let creating = ActionFlags::for_raw_status("Creating(3/5)");
        assert!(!creating.resume && !creating.suspend && !creating.restart);
        assert!(creating.delete);

        // Partial-Running classifies as Running but is not exactly "Running"
        assert!(!ActionFlags::for_raw_status("Partial-Running").suspend);
    }

    #[test]
    fn test_mci_rows() {
        let view = build_view(&SelectionCoordinator::new());

        assert_eq!(view.generation, 9);
        assert_eq!(view.mci_rows.len(), 2);
        let web = &view.mci_rows[0];
        assert_eq!(web.id, "web");
        assert_eq!(web.status, CanonicalStatus::Running);
        assert_eq!(web.providers, "aws, gcp");
        assert_eq!(web.vm_count, 2);
        assert!(web.actions.suspend);
    }

    #[test]
    fn test_vm_rows_scoped_by_selection() {
        let index = InventoryIndex::build(&sample_snapshot());
        let agg = aggregate(&index);
        let mut sel = SelectionCoordinator::new();

        let all = publish(&index, &agg, &sel);
        assert_eq!(all.vm_rows.len(), 3);
        assert_eq!(all.selection.header, "All VMs (3)");

        sel.select(&index, "batch");
        let focused = publish(&index, &agg, &sel);
        assert_eq!(focused.vm_rows.len(), 1);
        assert_eq!(focused.vm_rows[0].id, "b1");
        assert_eq!(focused.selection.focused_mci_id.as_deref(), Some("batch"));
        assert_eq!(focused.selection.header, "batch (1 VMs)");
    }

    #[test]
    fn test_chart_series_align_with_fixed_labels() {
        let view = build_view(&SelectionCoordinator::new());

        assert_eq!(view.charts.status_labels.len(), 9);
        assert_eq!(view.charts.status_labels[2], "Running");
        assert_eq!(view.charts.mci_status_series[2], 1); // web
        assert_eq!(view.charts.vm_status_series[2], 2); // w1, w2
        assert_eq!(view.charts.status_labels[3], "Suspended");
        assert_eq!(view.charts.vm_status_series[3], 1); // b1

        let providers: Vec<&str> = view
            .charts
            .provider_region_series
            .iter()
            .map(|s| s.provider.as_str())
            .collect();
        assert_eq!(providers, vec!["aws", "gcp"]);
    }

    #[test]
    fn test_badges() {
        let view = build_view(&SelectionCoordinator::new());
        assert_eq!(view.badges.mci_total, 2);
        assert_eq!(view.badges.vm_total, 3);
        assert_eq!(view.badges.running_vms, 2);
        assert_eq!(view.badges.failed_vms, 0);
        assert_eq!(view.badges.distinct_providers, 2);
    }

    #[test]
    fn test_publish_is_idempotent() {
        let index = InventoryIndex::build(&sample_snapshot());
        let agg = aggregate(&index);
        let sel = SelectionCoordinator::new();

        let first = publish(&index, &agg, &sel);
        let second = publish(&index, &agg, &sel);
        assert_eq!(first, second);

        // identical down to the serialized payload the host page consumes
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
