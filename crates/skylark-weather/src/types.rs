use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The only envelope status that counts as success.
pub const STATUS_OK: &str = "ok";

/// Coordinates, kept as the decimal strings the service sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub lng: String,
    pub lat: String,
}

impl Location {
    pub fn new(lng: impl Into<String>, lat: impl Into<String>) -> Self {
        Self {
            lng: lng.into(),
            lat: lat.into(),
        }
    }
}

/// A geocoding match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub location: Location,
    #[serde(rename = "formatted_address")]
    pub address: String,
}

impl Place {
    pub fn new(name: impl Into<String>, location: Location, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location,
            address: address.into(),
        }
    }
}

/// Sky condition categories mapped from the service's `skycon` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SkyCondition {
    #[default]
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Wind,
    LightRain,
    ModerateRain,
    HeavyRain,
    StormRain,
    ThunderShower,
    Sleet,
    LightSnow,
    ModerateSnow,
    HeavySnow,
    StormSnow,
    Hail,
    LightHaze,
    ModerateHaze,
    HeavyHaze,
    Fog,
    Dust,
}

impl SkyCondition {
    /// Convert a `skycon` code to a SkyCondition
    pub fn from_code(code: &str) -> Self {
        match code {
            "CLEAR_DAY" => Self::ClearDay,
            "CLEAR_NIGHT" => Self::ClearNight,
            "PARTLY_CLOUDY_DAY" => Self::PartlyCloudyDay,
            "PARTLY_CLOUDY_NIGHT" => Self::PartlyCloudyNight,
            "CLOUDY" => Self::Cloudy,
            "WIND" => Self::Wind,
            "LIGHT_RAIN" => Self::LightRain,
            "MODERATE_RAIN" => Self::ModerateRain,
            "HEAVY_RAIN" => Self::HeavyRain,
            "STORM_RAIN" => Self::StormRain,
            "THUNDER_SHOWER" => Self::ThunderShower,
            "SLEET" => Self::Sleet,
            "LIGHT_SNOW" => Self::LightSnow,
            "MODERATE_SNOW" => Self::ModerateSnow,
            "HEAVY_SNOW" => Self::HeavySnow,
            "STORM_SNOW" => Self::StormSnow,
            "HAIL" => Self::Hail,
            "LIGHT_HAZE" => Self::LightHaze,
            "MODERATE_HAZE" => Self::ModerateHaze,
            "HEAVY_HAZE" => Self::HeavyHaze,
            "FOG" => Self::Fog,
            "DUST" => Self::Dust,
            _ => Self::ClearDay, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClearDay | Self::ClearNight => "Clear",
            Self::PartlyCloudyDay | Self::PartlyCloudyNight => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Wind => "Windy",
            Self::LightRain => "Light Rain",
            Self::ModerateRain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::StormRain => "Rainstorm",
            Self::ThunderShower => "Thunder Shower",
            Self::Sleet => "Sleet",
            Self::LightSnow => "Light Snow",
            Self::ModerateSnow => "Snow",
            Self::HeavySnow => "Heavy Snow",
            Self::StormSnow => "Snowstorm",
            Self::Hail => "Hail",
            Self::LightHaze => "Light Haze",
            Self::ModerateHaze => "Haze",
            Self::HeavyHaze => "Heavy Haze",
            Self::Fog => "Fog",
            Self::Dust => "Dust",
        }
    }

    /// Get icon name
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::ClearDay => "sun",
            Self::ClearNight => "moon",
            Self::PartlyCloudyDay => "cloud_sun",
            Self::PartlyCloudyNight => "cloud_moon",
            Self::Cloudy => "cloud",
            Self::Wind => "wind",
            Self::LightRain | Self::ModerateRain | Self::HeavyRain | Self::StormRain => {
                "cloud_rain"
            }
            Self::ThunderShower => "cloud_lightning",
            Self::Sleet | Self::Hail => "cloud_snow",
            Self::LightSnow | Self::ModerateSnow | Self::HeavySnow | Self::StormSnow => {
                "cloud_snow"
            }
            Self::LightHaze | Self::ModerateHaze | Self::HeavyHaze | Self::Fog => "cloud_fog",
            Self::Dust => "wind",
        }
    }
}

/// Current conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConditions {
    pub skycon: String,
    pub temperature: f32,
    pub air_quality: AirQuality,
}

impl RealtimeConditions {
    pub fn sky(&self) -> SkyCondition {
        SkyCondition::from_code(&self.skycon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub aqi: Aqi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aqi {
    /// China AQI standard
    pub chn: f32,
}

/// Multi-day forecast, structurally mirroring the service's `daily` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub temperature: Vec<TemperatureRange>,
    pub skycon: Vec<DailySkycon>,
    pub life_index: LifeIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub max: f32,
    pub min: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySkycon {
    pub value: String,
    /// Wire form, e.g. `2024-05-01T00:00+08:00`
    pub date: String,
}

impl DailySkycon {
    /// Calendar day of this entry, if the date string starts with `YYYY-MM-DD`.
    pub fn date(&self) -> Option<NaiveDate> {
        let day = self.date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn sky(&self) -> SkyCondition {
        SkyCondition::from_code(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeIndex {
    #[serde(rename = "coldRisk")]
    pub cold_risk: Vec<LifeDescription>,
    #[serde(rename = "carWashing")]
    pub car_washing: Vec<LifeDescription>,
    pub ultraviolet: Vec<LifeDescription>,
    pub dressing: Vec<LifeDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeDescription {
    pub desc: String,
}

/// One row of the daily forecast
#[derive(Debug, Clone, PartialEq)]
pub struct DayForecast {
    pub date: Option<NaiveDate>,
    pub sky: SkyCondition,
    pub max: f32,
    pub min: f32,
}

impl DailyForecast {
    /// Per-day rows, as many as both the temperature and sky lists cover.
    pub fn days(&self) -> impl Iterator<Item = DayForecast> + '_ {
        self.temperature
            .iter()
            .zip(self.skycon.iter())
            .map(|(temperature, skycon)| DayForecast {
                date: skycon.date(),
                sky: skycon.sky(),
                max: temperature.max,
                min: temperature.min,
            })
    }
}

/// Joined result of the realtime and daily fetches.
///
/// Only ever built from two successful fetches; there is no partial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub realtime: RealtimeConditions,
    pub daily: DailyForecast,
}

/// Just the `status` of any envelope. Decoded before the payload so a
/// rejection is reported with its literal status even when the rest of the
/// body does not match the payload shape.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeHeader {
    pub status: String,
}

impl EnvelopeHeader {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// A status-carrying response wrapper.
pub trait Envelope: DeserializeOwned {
    type Payload;

    /// The payload, or `None` if the service left it out.
    fn into_payload(self) -> Option<Self::Payload>;
}

/// `GET /v2/place`
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSearchResponse {
    pub status: String,
    #[serde(default)]
    pub places: Option<Vec<Place>>,
}

impl Envelope for PlaceSearchResponse {
    type Payload = Vec<Place>;

    fn into_payload(self) -> Option<Vec<Place>> {
        self.places
    }
}

/// `GET /v2.5/{token}/{lng},{lat}/realtime.json`
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<RealtimeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeResult {
    pub realtime: RealtimeConditions,
}

impl Envelope for RealtimeResponse {
    type Payload = RealtimeConditions;

    fn into_payload(self) -> Option<RealtimeConditions> {
        self.result.map(|r| r.realtime)
    }
}

/// `GET /v2.5/{token}/{lng},{lat}/daily.json`
#[derive(Debug, Clone, Deserialize)]
pub struct DailyResponse {
    pub status: String,
    #[serde(default)]
    pub result: Option<DailyResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyResult {
    pub daily: DailyForecast,
}

impl Envelope for DailyResponse {
    type Payload = DailyForecast;

    fn into_payload(self) -> Option<DailyForecast> {
        self.result.map(|r| r.daily)
    }
}
