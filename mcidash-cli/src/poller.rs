//! Refresh loop
//!
//! Drives the dashboard from a feed adapter. Push mode is used when the
//! adapter exposes it; otherwise the loop polls on a fixed interval. The
//! `watch` shutdown channel stops the pending timer deterministically: once
//! it flips, no further tick fires and no callback outlives the loop.

use std::time::Duration;

use tokio::sync::{broadcast, watch};

use mcidash_core::dashboard::{ControlOutcome, Dashboard, RebuildOutcome};
use mcidash_core::feed::{ControlAction, ControlScope, FeedAdapter, FeedError};

pub struct Poller<F> {
    feed: F,
    interval: Duration,
}

impl<F: FeedAdapter> Poller<F> {
    pub fn new(feed: F, interval: Duration) -> Self {
        Self { feed, interval }
    }

    /// One pull-and-apply cycle; used by the one-shot commands.
    pub async fn refresh_once(&self, dashboard: &mut Dashboard) -> Result<RebuildOutcome, FeedError> {
        let snapshot = self.feed.fetch_snapshot().await?;
        Ok(dashboard.apply_snapshot(&snapshot))
    }

    /// Fire a control action through the feed and report the outcome back,
    /// stamped with the generation committed at send time. A snapshot that
    /// commits while the request is in flight makes the outcome stale and
    /// the dashboard discards it.
    pub async fn send_control(
        &self,
        dashboard: &mut Dashboard,
        scope: ControlScope,
        id: &str,
        action: ControlAction,
    ) -> ControlOutcome {
        let sent_at = dashboard.generation();
        let result = self.feed.send_control(scope, id, action).await;
        dashboard.record_control_outcome(sent_at, result)
    }

    /// Run until `shutdown` flips to true or the feed closes. `on_rebuild`
    /// fires after every applied snapshot.
    pub async fn run(
        &self,
        dashboard: &mut Dashboard,
        mut shutdown: watch::Receiver<bool>,
        mut on_rebuild: impl FnMut(&Dashboard),
    ) {
        if let Some(mut rx) = self.feed.subscribe() {
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    snap = rx.recv() => {
                        match snap {
                            Ok(snapshot) => {
                                if let RebuildOutcome::Applied { .. } = dashboard.apply_snapshot(&snapshot) {
                                    on_rebuild(dashboard);
                                }
                            }
                            // dropped events are fine: the next one carries
                            // a newer generation and replaces everything
                            Err(broadcast::error::RecvError::Lagged(_)) => continue,
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
            return;
        }

        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tick.tick() => {
                    match self.feed.fetch_snapshot().await {
                        Ok(snapshot) => {
                            if let RebuildOutcome::Applied { .. } = dashboard.apply_snapshot(&snapshot) {
                                on_rebuild(dashboard);
                            }
                        }
                        Err(FeedError::Transport { message }) => {
                            dashboard.note_transport_failure(&message);
                        }
                        Err(e) => {
                            // a fetch should never yield an action error;
                            // treat anything else as degraded connectivity
                            dashboard.note_transport_failure(&e.to_string());
                        }
                    }
                }
            }
        }
    }
}
