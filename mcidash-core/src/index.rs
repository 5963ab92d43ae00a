//! Normalized, queryable view of one snapshot generation
//!
//! The index is rebuilt from scratch on every refresh; it never survives a
//! snapshot boundary. Derived VM order equals the MCI list order, and within
//! each MCI the original embedded order, so that table rendering stays
//! stable across refreshes when content hasn't changed.

use std::collections::BTreeMap;

use crate::model::{InventorySnapshot, MciId, MciRecord, VmRecord};

#[derive(Clone, Debug, Default)]
pub struct InventoryIndex {
    generation: u64,
    /// MCI headers in snapshot order, embedded VM lists emptied
    mcis: Vec<MciRecord>,
    mci_pos: BTreeMap<MciId, usize>,
    /// Flattened VMs, grouped contiguously per MCI in canonical order
    vms: Vec<VmRecord>,
    vm_ranges: BTreeMap<MciId, (usize, usize)>,
    dropped_orphans: usize,
}

impl InventoryIndex {
    /// Build the index for one snapshot.
    ///
    /// Every VM produced belongs to exactly one MCI present in the same
    /// snapshot. Flat-list entries whose parent cannot be resolved are
    /// dropped and counted rather than aborting the whole rebuild; duplicate
    /// MCI ids keep their first occurrence.
    pub fn build(snapshot: &InventorySnapshot) -> Self {
        let mut index = InventoryIndex {
            generation: snapshot.generation,
            ..Default::default()
        };

        for mci in &snapshot.mcis {
            if index.mci_pos.contains_key(&mci.id) {
                continue;
            }
            let mut header = mci.clone();
            header.vms = Vec::new();
            index.mci_pos.insert(header.id.clone(), index.mcis.len());
            index.mcis.push(header);
        }

        match &snapshot.vms {
            Some(flat) => index.group_flat_list(flat),
            None => index.flatten_embedded(&snapshot.mcis),
        }

        index
    }

    /// Flat-list path: group by parent, preserving MCI order and the
    /// original list order within each parent.
    fn group_flat_list(&mut self, flat: &[VmRecord]) {
        let mut by_parent: BTreeMap<MciId, Vec<VmRecord>> = BTreeMap::new();
        for vm in flat {
            if !self.mci_pos.contains_key(&vm.parent_id) {
                self.dropped_orphans += 1;
                continue;
            }
            by_parent.entry(vm.parent_id.clone()).or_default().push(vm.clone());
        }

        for pos in 0..self.mcis.len() {
            let id = self.mcis[pos].id.clone();
            let mci_status = self.mcis[pos].status.clone();
            let start = self.vms.len();
            if let Some(group) = by_parent.remove(&id) {
                for mut vm in group {
                    vm.mci_status = mci_status.clone();
                    self.vms.push(vm);
                }
            }
            self.vm_ranges.insert(id, (start, self.vms.len()));
        }
    }

    /// Embedded path: flatten each MCI's own VM list, stamping the
    /// back-reference and the parent status context.
    fn flatten_embedded(&mut self, mcis: &[MciRecord]) {
        for mci in mcis {
            if self.vm_ranges.contains_key(&mci.id) {
                // duplicate header already skipped above
                continue;
            }
            let start = self.vms.len();
            for vm in &mci.vms {
                let mut vm = vm.clone();
                vm.parent_id = mci.id.clone();
                vm.mci_status = mci.status.clone();
                self.vms.push(vm);
            }
            self.vm_ranges.insert(mci.id.clone(), (start, self.vms.len()));
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// MCI headers in snapshot order (embedded VM lists are emptied; use
    /// `vms_of` for members).
    pub fn mcis(&self) -> &[MciRecord] {
        &self.mcis
    }

    pub fn mci_by_id(&self, id: &str) -> Option<&MciRecord> {
        self.mci_pos.get(id).map(|&pos| &self.mcis[pos])
    }

    pub fn contains_mci(&self, id: &str) -> bool {
        self.mci_pos.contains_key(id)
    }

    /// Member VMs of one MCI in canonical order; empty for unknown ids.
    pub fn vms_of(&self, id: &str) -> &[VmRecord] {
        match self.vm_ranges.get(id) {
            Some(&(start, end)) => &self.vms[start..end],
            None => &[],
        }
    }

    /// All VMs in canonical order (MCI order, then embedded order).
    pub fn all_vms(&self) -> &[VmRecord] {
        &self.vms
    }

    /// Flat-list entries dropped because their parent was absent.
    pub fn dropped_orphans(&self) -> usize {
        self.dropped_orphans
    }

    /// Distinct provider names across one MCI's VMs, sorted.
    pub fn provider_set(&self, id: &str) -> Vec<String> {
        let mut providers: Vec<String> = self
            .vms_of(id)
            .iter()
            .map(|vm| vm.provider().to_string())
            .collect();
        providers.sort();
        providers.dedup();
        providers
    }
}
