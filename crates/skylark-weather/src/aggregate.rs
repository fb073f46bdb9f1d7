//! Realtime + daily fan-out/fan-in.
//!
//! Both sub-fetches are polled concurrently and always awaited to completion
//! before the join rule runs. Dropping the returned future drops both
//! in-flight requests with it.

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::client::WeatherClient;
use crate::error::WeatherError;
use crate::types::{DailyForecast, RealtimeConditions, Weather};

/// Fetch realtime conditions and the daily forecast concurrently and join them.
///
/// Succeeds only if both halves succeed. Any failure yields
/// [`WeatherError::Aggregate`] describing both halves; nothing is retried.
#[instrument(skip(client), level = "info")]
pub async fn refresh_weather(
    client: &WeatherClient,
    lng: &str,
    lat: &str,
) -> Result<Weather, WeatherError> {
    let (realtime, daily) = tokio::join!(
        client.get_realtime_weather(lng, lat),
        client.get_daily_weather(lng, lat),
    );
    join(realtime, daily)
}

/// [`refresh_weather`] that gives up as soon as `cancel` fires.
///
/// Cancellation drops both outstanding requests and yields
/// [`WeatherError::Cancelled`].
pub async fn refresh_weather_until_cancelled(
    client: &WeatherClient,
    lng: &str,
    lat: &str,
    cancel: &CancellationToken,
) -> Result<Weather, WeatherError> {
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!("Weather refresh for {},{} cancelled", lng, lat);
            Err(WeatherError::Cancelled)
        }
        result = refresh_weather(client, lng, lat) => result,
    }
}

/// The join rule: all or nothing.
pub fn join(
    realtime: Result<RealtimeConditions, WeatherError>,
    daily: Result<DailyForecast, WeatherError>,
) -> Result<Weather, WeatherError> {
    match (realtime, daily) {
        (Ok(realtime), Ok(daily)) => Ok(Weather { realtime, daily }),
        (realtime, daily) => {
            let err = WeatherError::Aggregate {
                realtime: fragment(&realtime),
                daily: fragment(&daily),
            };
            tracing::warn!("Weather refresh failed: {}", err);
            Err(err)
        }
    }
}

fn fragment<T>(result: &Result<T, WeatherError>) -> String {
    match result {
        Ok(_) => crate::types::STATUS_OK.to_string(),
        Err(e) => e.status_fragment(),
    }
}
