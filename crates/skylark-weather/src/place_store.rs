//! The user's single saved place.

use std::sync::Arc;

use skylark_core::KeyValueStore;

use crate::error::WeatherError;
use crate::types::Place;

/// Key the saved place is stored under.
pub const PLACE_KEY: &str = "place";

/// Persists at most one [`Place`] as JSON in a preference namespace.
///
/// Not synchronized beyond what the backing store provides; callers drive it
/// from one thread.
#[derive(Clone)]
pub struct PlaceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PlaceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Save `place`, replacing whatever was saved before.
    pub fn save(&self, place: &Place) -> Result<(), WeatherError> {
        let json = serde_json::to_string(place)
            .map_err(|e| WeatherError::Storage(format!("failed to serialize place: {}", e)))?;
        self.store.put(PLACE_KEY, json)?;
        tracing::info!("Saved place '{}'", place.name);
        Ok(())
    }

    /// The saved place.
    pub fn load(&self) -> Result<Place, WeatherError> {
        let json = self
            .store
            .get(PLACE_KEY)
            .ok_or_else(|| WeatherError::NotFound(PLACE_KEY.to_string()))?;
        serde_json::from_str(&json).map_err(|e| {
            tracing::warn!("Saved place is unreadable: {}", e);
            WeatherError::Storage(format!("saved place is corrupted: {}", e))
        })
    }

    /// Whether a place has been saved. Does not parse it.
    pub fn is_saved(&self) -> bool {
        self.store.contains(PLACE_KEY)
    }
}

impl std::fmt::Debug for PlaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceStore").finish_non_exhaustive()
    }
}
