//! Online / offline switch
//!
//! Follows the reachability signal until the user picks a mode by hand. A
//! manual choice sticks until [`OfflineMode::clear_manual`] is called, after
//! which the last reachability signal applies again.

use crate::layers::manager::ListenerId;
use serde::{Deserialize, Serialize};

type Listener = Box<dyn FnMut(NetworkMode) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Tiles come from the network
    Online,
    /// Tiles come from the local cache only
    Offline,
}

impl NetworkMode {
    pub fn toggled(self) -> Self {
        match self {
            NetworkMode::Online => NetworkMode::Offline,
            NetworkMode::Offline => NetworkMode::Online,
        }
    }
}

/// Network path properties reported on every path change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStatus {
    /// Low data mode is on
    pub constrained: bool,
    /// The path is metered, e.g. cellular or a personal hotspot
    pub expensive: bool,
}

impl PathStatus {
    /// Mode implied by this path
    pub fn preferred_mode(&self) -> NetworkMode {
        if self.constrained || self.expensive {
            NetworkMode::Offline
        } else {
            NetworkMode::Online
        }
    }
}

pub struct OfflineMode {
    mode: NetworkMode,
    manually_set: bool,
    last_status: PathStatus,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: ListenerId,
}

impl OfflineMode {
    /// Starts in the mode implied by the reachability signal at startup
    pub fn new(initial: PathStatus) -> Self {
        Self {
            mode: initial.preferred_mode(),
            manually_set: false,
            last_status: initial,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }

    pub fn is_offline(&self) -> bool {
        self.mode == NetworkMode::Offline
    }

    pub fn is_manually_set(&self) -> bool {
        self.manually_set
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(NetworkMode) + Send + 'static,
    {
        let id = self.next_listener;
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Applies a reachability signal; ignored while a manual mode is in force.
    ///
    /// Returns whether the mode changed.
    pub fn on_reachability(&mut self, status: PathStatus) -> bool {
        self.last_status = status;
        if self.manually_set {
            log::debug!("ignoring reachability change {:?}: mode set manually", status);
            return false;
        }
        self.set(status.preferred_mode())
    }

    /// Picks a mode by hand, suppressing automatic changes
    pub fn set_manual(&mut self, mode: NetworkMode) -> bool {
        self.manually_set = true;
        self.set(mode)
    }

    /// Flips the current mode by hand
    pub fn toggle(&mut self) -> NetworkMode {
        self.set_manual(self.mode.toggled());
        self.mode
    }

    /// Re-arms automatic detection and applies the last reachability signal
    pub fn clear_manual(&mut self) -> bool {
        self.manually_set = false;
        self.set(self.last_status.preferred_mode())
    }

    fn set(&mut self, mode: NetworkMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        log::info!("network mode is now {:?}", mode);
        for (_, listener) in self.listeners.iter_mut() {
            listener(mode);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const CELLULAR: PathStatus = PathStatus {
        constrained: false,
        expensive: true,
    };
    const WIFI: PathStatus = PathStatus {
        constrained: false,
        expensive: false,
    };

    #[test]
    fn test_initial_mode_follows_signal() {
        assert_eq!(OfflineMode::new(WIFI).mode(), NetworkMode::Online);
        assert_eq!(OfflineMode::new(CELLULAR).mode(), NetworkMode::Offline);
        let low_data = PathStatus {
            constrained: true,
            expensive: false,
        };
        assert!(OfflineMode::new(low_data).is_offline());
    }

    #[test]
    fn test_automatic_flips_notify_listeners() {
        let mut mode = OfflineMode::new(WIFI);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        mode.subscribe(move |m| sink.lock().unwrap().push(m));

        assert!(mode.on_reachability(CELLULAR));
        assert!(!mode.on_reachability(CELLULAR));
        assert!(mode.on_reachability(WIFI));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![NetworkMode::Offline, NetworkMode::Online]
        );
    }

    #[test]
    fn test_manual_override_persists_until_cleared() {
        let mut mode = OfflineMode::new(WIFI);
        assert_eq!(mode.toggle(), NetworkMode::Offline);
        assert!(mode.is_manually_set());

        assert!(!mode.on_reachability(WIFI));
        assert!(!mode.on_reachability(CELLULAR));
        assert!(!mode.on_reachability(WIFI));
        assert!(mode.is_offline());

        assert!(mode.clear_manual());
        assert_eq!(mode.mode(), NetworkMode::Online);
        assert!(mode.on_reachability(CELLULAR));
    }
}
