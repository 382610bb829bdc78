//! Playback coordination for the RadioAristocrats player.
//!
//! [`PlaybackCoordinator`] owns the single stream of the process. Pages,
//! remote commands, interruptions and reachability changes all go through
//! it, and it reports back on a [`PlaybackEventBus`].

mod events;

pub mod coordinator;
pub mod engine;
pub mod errors;
pub mod locale;
pub mod now_playing;
pub mod page;
pub mod reachability;
pub mod refresher;

pub use coordinator::{Interruption, PlaybackCoordinator, PlayerStatus, RemoteCommand};
pub use engine::{PlaybackEngine, StreamStatus, VirtualEngine};
pub use errors::{PlayerError, Result};
pub use events::{PlaybackEvent, PlaybackEventBus};
pub use locale::{Language, LanguagePreference, LocalizableString};
pub use now_playing::{Artwork, ArtworkRequest, NowPlayingInfo, TrackDisplay};
pub use page::{ChannelPage, FetchTicket, PageAlert};
pub use reachability::{NetworkStatus, NetworkTransition, QualityExt, ReachabilityTracker};
pub use refresher::NowPlayingRefresher;
