//! Single entry point for the presentation layer.
//!
//! Network operations run on the injected runtime and come back as
//! [`ResultChannel`]s; saved-place access is synchronous.

use tokio::runtime::Handle;

use crate::aggregate;
use crate::channel::{fire, LatestOnly, ResultChannel};
use crate::client::WeatherClient;
use crate::error::WeatherError;
use crate::place_store::PlaceStore;
use crate::types::{Location, Place, Weather};

#[derive(Debug, Clone)]
pub struct Repository {
    client: WeatherClient,
    places: PlaceStore,
    runtime: Handle,
}

impl Repository {
    pub fn new(client: WeatherClient, places: PlaceStore, runtime: Handle) -> Self {
        Self {
            client,
            places,
            runtime,
        }
    }

    /// Search for places matching `query` in the background.
    pub fn search_places(&self, query: &str) -> ResultChannel<Vec<Place>> {
        let client = self.client.clone();
        let query = query.to_string();
        fire(&self.runtime, async move { client.search_places(&query).await })
    }

    /// Fetch realtime and daily weather for a location in the background.
    pub fn refresh_weather(&self, lng: &str, lat: &str) -> ResultChannel<Weather> {
        let client = self.client.clone();
        let (lng, lat) = (lng.to_string(), lat.to_string());
        fire(&self.runtime, async move {
            aggregate::refresh_weather(&client, &lng, &lat).await
        })
    }

    pub fn save_place(&self, place: &Place) -> Result<(), WeatherError> {
        self.places.save(place)
    }

    pub fn saved_place(&self) -> Result<Place, WeatherError> {
        self.places.load()
    }

    pub fn is_place_saved(&self) -> bool {
        self.places.is_saved()
    }

    /// Search-as-you-type: each query supersedes the previous one.
    ///
    /// A blank query publishes an empty list without touching the network.
    pub fn place_search(&self) -> LatestOnly<String, Vec<Place>> {
        let repository = self.clone();
        LatestOnly::new(self.runtime.clone(), move |query: String| {
            if query.trim().is_empty() {
                return fire(&repository.runtime, async { Ok(Vec::new()) });
            }
            repository.search_places(&query)
        })
    }

    /// Weather for the latest location; `retrigger` refreshes it.
    pub fn weather_refresh(&self) -> LatestOnly<Location, Weather> {
        let repository = self.clone();
        LatestOnly::new(self.runtime.clone(), move |location: Location| {
            repository.refresh_weather(&location.lng, &location.lat)
        })
    }
}
