//! Plain-text stand-in for the rendering layer
//!
//! The real dashboard hands `DashboardView` to an HTML/chart front end; this
//! printer exists so the watch loop has something to show in a terminal.

use mcidash_core::view::{ActionFlags, DashboardView};

fn action_summary(flags: &ActionFlags) -> String {
    let mut enabled = Vec::new();
    if flags.resume {
        enabled.push("resume");
    }
    if flags.suspend {
        enabled.push("suspend");
    }
    if flags.restart {
        enabled.push("restart");
    }
    if flags.delete {
        enabled.push("delete");
    }
    enabled.join("/")
}

pub fn print_text(view: &DashboardView) {
    println!(
        "── generation {} ── {} MCIs, {} VMs, {} providers{}",
        view.generation,
        view.badges.mci_total,
        view.badges.vm_total,
        view.badges.distinct_providers,
        if view.connectivity_degraded {
            " [connectivity degraded]"
        } else {
            ""
        }
    );

    for row in &view.mci_rows {
        println!(
            "  {:<12} {:<16} [{:<9}] vms={} providers=[{}] actions={}",
            row.id,
            row.raw_status,
            row.status.label(),
            row.vm_count,
            row.providers,
            action_summary(&row.actions),
        );
    }

    println!("  {}", view.selection.header);
    for row in &view.vm_rows {
        println!(
            "    {:<12} {:<16} [{:<9}] {}/{} {}",
            row.id,
            row.raw_status,
            row.status.label(),
            row.provider,
            row.region,
            row.public_ip.as_deref().unwrap_or("-"),
        );
    }

    if let Some(err) = &view.last_action_error {
        println!("  ! last action failed: {}", err);
    }
}

pub fn print_json(view: &DashboardView) {
    match serde_json::to_string_pretty(view) {
        Ok(payload) => println!("{}", payload),
        Err(e) => eprintln!("failed to serialize view model: {}", e),
    }
}
