//! Network reachability.
//!
//! The platform notifier is outside this crate; it feeds observed statuses to
//! a [`ReachabilityTracker`], which pairs each one with the previous status
//! and hands the transition to the coordinator.

use aristoradio::Quality;
use tracing::debug;

use crate::coordinator::PlaybackCoordinator;
use crate::errors::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    NotReachable,
    ReachableViaWiFi,
    ReachableViaWWAN,
}

impl NetworkStatus {
    pub fn is_reachable(self) -> bool {
        !matches!(self, NetworkStatus::NotReachable)
    }
}

/// Stream quality picked from the current network.
pub trait QualityExt {
    fn for_network(status: Option<NetworkStatus>) -> Quality;
}

impl QualityExt for Quality {
    /// WiFi gets `Best`, cellular gets `Edge`, unknown falls back to `Best`.
    fn for_network(status: Option<NetworkStatus>) -> Quality {
        match status {
            Some(NetworkStatus::ReachableViaWWAN) => Quality::Edge,
            _ => Quality::Best,
        }
    }
}

/// A `(previous, current)` pair of observed statuses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkTransition {
    pub previous: NetworkStatus,
    pub current: NetworkStatus,
}

impl NetworkTransition {
    /// Connectivity came back after an outage.
    pub fn is_restored(&self) -> bool {
        !self.previous.is_reachable() && self.current.is_reachable()
    }

    pub fn is_lost(&self) -> bool {
        self.previous.is_reachable() && !self.current.is_reachable()
    }
}

#[derive(Debug)]
pub struct ReachabilityTracker {
    previous: NetworkStatus,
}

impl ReachabilityTracker {
    /// `initial` is the status read when the notifier starts; WiFi is assumed
    /// when the platform could not tell.
    pub fn new(initial: Option<NetworkStatus>) -> Self {
        Self {
            previous: initial.unwrap_or(NetworkStatus::ReachableViaWiFi),
        }
    }

    pub fn current(&self) -> NetworkStatus {
        self.previous
    }

    pub fn is_internet_connection_available(&self) -> bool {
        self.previous.is_reachable()
    }

    /// Every notification yields a transition, even when the status repeats.
    pub fn observe(&mut self, current: NetworkStatus) -> NetworkTransition {
        let transition = NetworkTransition {
            previous: self.previous,
            current,
        };
        debug!(previous = ?transition.previous, current = ?current, "Reachability changed");
        self.previous = current;
        transition
    }

    /// Record `current` and forward the transition to the coordinator.
    pub fn forward(
        &mut self,
        current: NetworkStatus,
        coordinator: &PlaybackCoordinator,
    ) -> Result<NetworkTransition> {
        let transition = self.observe(current);
        coordinator.on_network_change(transition.previous, transition.current)?;
        Ok(transition)
    }
}
