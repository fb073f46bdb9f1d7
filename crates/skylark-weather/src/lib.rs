//! Place search and weather retrieval for Skylark.
//!
//! The [`WeatherClient`] talks to the forecast service, [`refresh_weather`]
//! joins the realtime and daily halves, and [`Repository`] runs everything in
//! the background behind single-shot [`ResultChannel`]s. The user's chosen
//! place is kept by [`PlaceStore`].

pub mod aggregate;
pub mod channel;
pub mod client;
pub mod error;
pub mod place_store;
pub mod repository;
pub mod types;

pub use aggregate::{refresh_weather, refresh_weather_until_cancelled};
pub use channel::{fire, LatestOnly, Observation, Observer, ResultChannel};
pub use client::{Endpoint, HttpObserver, TracingObserver, WeatherClient};
pub use error::WeatherError;
pub use place_store::{PlaceStore, PLACE_KEY};
pub use repository::Repository;
pub use types::{
    DailyForecast, DayForecast, Location, Place, RealtimeConditions, SkyCondition, Weather,
    STATUS_OK,
};
