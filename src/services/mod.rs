pub mod recently_viewed;

pub use recently_viewed::{RecentlyViewedEntry, RecentlyViewedTracker, TrackerError};
