use std::sync::{Arc, Mutex, MutexGuard};

use aristoradio::PlaybackState;
use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::coordinator::PlayerStatus;
use crate::now_playing::NowPlayingInfo;
use crate::reachability::NetworkStatus;

#[derive(Clone, Debug)]
pub enum PlaybackEvent {
    /// A new stream was loaded (paused) under a new generation.
    StreamChanged {
        state: PlaybackState,
        generation: u64,
    },
    PlayStateChanged {
        status: PlayerStatus,
    },
    NowPlayingChanged {
        info: Arc<NowPlayingInfo>,
    },
    /// Observers must re-read the play/pause state (audio interruption ended).
    ResyncRequested,
    ConnectivityChanged {
        previous: NetworkStatus,
        current: NetworkStatus,
    },
}

/// Fan-out of coordinator events.
///
/// Subscribers unsubscribe by dropping their receiver; dead senders are
/// pruned on the next broadcast.
#[derive(Clone, Default)]
pub struct PlaybackEventBus {
    subscribers: Arc<Mutex<Vec<Sender<PlaybackEvent>>>>,
}

impl PlaybackEventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Sender<PlaybackEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded::<PlaybackEvent>();
        self.subscribers().push(tx);
        rx
    }

    pub fn broadcast(&self, event: PlaybackEvent) {
        let mut subscribers = self.subscribers();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_events() {
        let bus = PlaybackEventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.broadcast(PlaybackEvent::ResyncRequested);

        assert!(matches!(a.try_recv(), Ok(PlaybackEvent::ResyncRequested)));
        assert!(matches!(b.try_recv(), Ok(PlaybackEvent::ResyncRequested)));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let bus = PlaybackEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.broadcast(PlaybackEvent::ResyncRequested);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.len(), 1);
    }
}
