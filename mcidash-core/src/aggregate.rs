//! Fleet-wide count aggregation
//!
//! Everything here is recomputed from the current index on every refresh.
//! Counts are never adjusted incrementally across snapshots; a missed
//! decrement/increment pair would otherwise drift the dashboard away from
//! reality, and providers or regions that disappear must not linger.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::index::InventoryIndex;
use crate::model::UNKNOWN;
use crate::status::{CanonicalStatus, classify};

/// Count per canonical status. Absent statuses read as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StatusCounts(BTreeMap<CanonicalStatus, u64>);

impl StatusCounts {
    pub fn record(&mut self, status: CanonicalStatus) {
        *self.0.entry(status).or_insert(0) += 1;
    }

    pub fn get(&self, status: CanonicalStatus) -> u64 {
        self.0.get(&status).copied().unwrap_or(0)
    }

    /// Always equals the size of the counted collection.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

/// Aggregates derived from one snapshot generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FleetAggregates {
    pub mci_counts: StatusCounts,
    pub vm_counts: StatusCounts,
    /// provider -> region -> VM count; exactly the pairs observed in the
    /// current snapshot, nothing carried over
    pub provider_region: BTreeMap<String, BTreeMap<String, u64>>,
    /// Distinct resolved providers, the `Unknown` fallback excluded
    pub distinct_provider_count: usize,
}

/// Compute all dashboard aggregates for the given index.
pub fn aggregate(index: &InventoryIndex) -> FleetAggregates {
    let mut out = FleetAggregates::default();

    for mci in index.mcis() {
        out.mci_counts.record(classify(&mci.status));
    }

    let mut providers: BTreeSet<&str> = BTreeSet::new();
    for vm in index.all_vms() {
        out.vm_counts.record(classify(&vm.status));

        let provider = vm.provider();
        let region = vm.region_name();
        *out.provider_region
            .entry(provider.to_string())
            .or_default()
            .entry(region.to_string())
            .or_insert(0) += 1;

        if provider != UNKNOWN {
            providers.insert(provider);
        }
    }
    out.distinct_provider_count = providers.len();

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventorySnapshot, MciRecord, VmRecord};

    fn vm(id: &str, conn: Option<&str>, region: Option<&str>, status: &str) -> VmRecord {
        VmRecord {
            id: id.into(),
            status: status.into(),
            connection_name: conn.map(Into::into),
            region: region.map(Into::into),
            ..Default::default()
        }
    }

    fn mci(id: &str, status: &str, vms: Vec<VmRecord>) -> MciRecord {
        MciRecord {
            id: id.into(),
            status: status.into(),
            vms,
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_sum_to_collection_sizes() {
        let snap = InventorySnapshot::new(
            1,
            vec![
                mci(
                    "m1",
                    "Running",
                    vec![
                        vm("a", Some("aws"), Some("us-east"), "Running"),
                        vm("b", Some("aws"), Some("us-west"), "Creating(2/4)"),
                    ],
                ),
                mci("m2", "Partial-Failed", vec![vm("c", Some("gcp"), Some("eu"), "Failed")]),
                mci("m3", "", vec![]),
            ],
        );
        let index = InventoryIndex::build(&snap);
        let agg = aggregate(&index);

        assert_eq!(agg.mci_counts.total(), 3);
        assert_eq!(agg.vm_counts.total(), 3);
        assert_eq!(agg.mci_counts.get(CanonicalStatus::Running), 1);
        assert_eq!(agg.mci_counts.get(CanonicalStatus::Failed), 1);
        assert_eq!(agg.mci_counts.get(CanonicalStatus::Other), 1);
        assert_eq!(agg.vm_counts.get(CanonicalStatus::Creating), 1);
    }

    #[test]
    fn test_provider_region_matrix_scenario() {
        // One MCI, three VMs across aws/aws/gcp in three regions.
        let snap = InventorySnapshot::new(
            1,
            vec![mci(
                "m1",
                "Running",
                vec![
                    vm("a", Some("aws"), Some("us-east"), "Running"),
                    vm("b", Some("aws"), Some("us-west"), "Running"),
                    vm("c", Some("gcp"), Some("eu"), "Running"),
                ],
            )],
        );
        let agg = aggregate(&InventoryIndex::build(&snap));

        assert_eq!(agg.distinct_provider_count, 2);
        let pairs: usize = agg.provider_region.values().map(|regions| regions.len()).sum();
        assert_eq!(pairs, 3);
        assert_eq!(agg.provider_region["aws"]["us-east"], 1);
        assert_eq!(agg.provider_region["aws"]["us-west"], 1);
        assert_eq!(agg.provider_region["gcp"]["eu"], 1);
    }

    #[test]
    fn test_unknown_provider_counted_in_matrix_not_in_distinct() {
        let snap = InventorySnapshot::new(
            1,
            vec![mci(
                "m1",
                "Running",
                vec![
                    vm("a", None, None, "Running"),
                    vm("b", Some("aws"), Some("us-east"), "Running"),
                ],
            )],
        );
        let agg = aggregate(&InventoryIndex::build(&snap));

        assert_eq!(agg.distinct_provider_count, 1);
        assert_eq!(agg.provider_region[UNKNOWN][UNKNOWN], 1);
    }

    #[test]
    fn test_matrix_rebuilt_from_scratch() {
        let first = InventorySnapshot::new(
            1,
            vec![mci("m1", "Running", vec![vm("a", Some("azure"), Some("kr"), "Running")])],
        );
        let second = InventorySnapshot::new(
            2,
            vec![mci("m1", "Running", vec![vm("a", Some("aws"), Some("us-east"), "Running")])],
        );

        let _ = aggregate(&InventoryIndex::build(&first));
        let agg = aggregate(&InventoryIndex::build(&second));

        // azure/kr must not linger after it disappears from the feed
        assert!(!agg.provider_region.contains_key("azure"));
        assert_eq!(agg.provider_region.len(), 1);
    }

    #[test]
    fn test_empty_index() {
        let agg = aggregate(&InventoryIndex::build(&InventorySnapshot::default()));
        assert_eq!(agg.mci_counts.total(), 0);
        assert_eq!(agg.vm_counts.total(), 0);
        assert!(agg.provider_region.is_empty());
        assert_eq!(agg.distinct_provider_count, 0);
    }
}
