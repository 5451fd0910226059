use serde::Deserialize;

/// Provider `code` value that marks a successful response.
pub const PROVIDER_SUCCESS_CODE: &str = "200";

/// Start label used when precipitation is already happening.
pub const NOW_LABEL: &str = "now";
/// End label used when precipitation is already happening.
pub const ONGOING_LABEL: &str = "ongoing";

/// Provider location key, e.g. `101010100` for Beijing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current conditions, as reported under `now`.
///
/// The provider sends every value as a string. Missing fields default to empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Observation {
    pub obs_time: String,
    pub temp: String,
    pub feels_like: String,
    pub icon: String,
    pub text: String,
    pub wind360: String,
    pub wind_dir: String,
    pub wind_scale: String,
    pub wind_speed: String,
    pub humidity: String,
    /// Precipitation over the last hour, millimetres
    pub precip: String,
    pub pressure: String,
    pub cloud: String,
    pub dew: String,
}

/// One entry of the hourly series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourlyEntry {
    /// `YYYY-MM-DDTHH:MM±HH:MM`
    pub fx_time: String,
    pub temp: String,
    pub icon: String,
    pub text: String,
    /// Expected precipitation for the hour, millimetres
    pub precip: String,
    pub wind360: String,
    pub wind_dir: String,
    pub wind_scale: String,
    pub wind_speed: String,
    pub humidity: String,
    /// Probability of precipitation, percent
    pub pop: String,
}

/// Responses that carry the provider's own status code.
pub trait ProviderStatus {
    fn code(&self) -> &str;

    /// Provider-supplied explanation for a failure code, if any.
    fn message(&self) -> Option<&str> {
        None
    }

    fn is_success(&self) -> bool {
        self.code() == PROVIDER_SUCCESS_CODE
    }
}

/// `/v7/weather/now`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NowResponse {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub now: Observation,
}

impl ProviderStatus for NowResponse {
    fn code(&self) -> &str {
        &self.code
    }
}

/// `/v7/weather/24h`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HourlyResponse {
    pub code: String,
    pub update_time: String,
    pub fx_link: String,
    pub hourly: Vec<HourlyEntry>,
}

impl ProviderStatus for HourlyResponse {
    fn code(&self) -> &str {
        &self.code
    }
}

/// `/geo/v2/city/lookup`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CityLookupResponse {
    pub code: String,
    pub info: Option<String>,
    pub count: u32,
    pub location: Vec<CityCandidate>,
}

impl ProviderStatus for CityLookupResponse {
    fn code(&self) -> &str {
        &self.code
    }

    fn message(&self) -> Option<&str> {
        self.info.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CityCandidate {
    pub id: String,
    pub name: String,
    pub country: String,
    pub adm1: String,
    pub adm2: String,
    pub lat: String,
    pub lon: String,
    pub tz: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub rank: String,
    pub fx_link: String,
}

/// Current conditions plus the hourly series for one check cycle.
#[derive(Debug, Clone, Default)]
pub struct CompositeReading {
    pub now: Observation,
    /// Chronologically non-decreasing, as delivered by the provider
    pub hourly: Vec<HourlyEntry>,
    /// Whether `now` already shows precipitation
    pub currently_precipitating: bool,
}

/// Intensity tier derived from an average hourly amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
    Extreme,
}

impl Intensity {
    /// Classify an average hourly amount in millimetres.
    pub fn from_average_mm(mm: f64) -> Self {
        if mm < 2.5 {
            Self::Light
        } else if mm < 10.0 {
            Self::Moderate
        } else if mm < 25.0 {
            Self::Heavy
        } else {
            Self::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
            Self::Extreme => "extreme",
        }
    }
}

/// Label used instead of a tier when precipitation is already happening.
pub const CURRENT_INTENSITY_LABEL: &str = "current precipitation";

/// Reduced forecast for the look-ahead horizon.
///
/// When `will_precipitate` is false the remaining fields are empty and carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastWindow {
    pub will_precipitate: bool,
    /// `HH:MM` of the first hit, or [`NOW_LABEL`]
    pub start: String,
    /// `HH:MM` of the last hit, or [`ONGOING_LABEL`]
    pub end: String,
    /// Most frequent description among hits
    pub weather_type: String,
    /// Tier label; empty when no hit carried a numeric amount
    pub intensity: String,
    /// Average amount with unit, e.g. `2.5mm`; empty when no hit carried a numeric amount
    pub amount: String,
}

impl ForecastWindow {
    pub fn none() -> Self {
        Self::default()
    }

    /// True when the window describes precipitation that is already happening.
    pub fn is_ongoing(&self) -> bool {
        self.will_precipitate && self.start == NOW_LABEL
    }

    /// Fixed forecast used to exercise the notification path without live data.
    pub fn simulated() -> Self {
        Self {
            will_precipitate: true,
            start: "15:30".to_string(),
            end: "18:30".to_string(),
            weather_type: "light rain".to_string(),
            intensity: "light to moderate".to_string(),
            amount: "5-15mm".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_thresholds() {
        assert_eq!(Intensity::from_average_mm(0.1), Intensity::Light);
        assert_eq!(Intensity::from_average_mm(2.4), Intensity::Light);
        assert_eq!(Intensity::from_average_mm(2.5), Intensity::Moderate);
        assert_eq!(Intensity::from_average_mm(9.9), Intensity::Moderate);
        assert_eq!(Intensity::from_average_mm(10.0), Intensity::Heavy);
        assert_eq!(Intensity::from_average_mm(24.9), Intensity::Heavy);
        assert_eq!(Intensity::from_average_mm(25.0), Intensity::Extreme);
        assert_eq!(Intensity::from_average_mm(80.0), Intensity::Extreme);
    }

    #[test]
    fn test_intensity_labels() {
        assert_eq!(Intensity::Light.label(), "light");
        assert_eq!(Intensity::Extreme.label(), "extreme");
    }

    #[test]
    fn test_now_response_deserialization() {
        let json = r#"{
            "code": "200",
            "updateTime": "2024-06-01T14:02+08:00",
            "fxLink": "https://www.qweather.com/weather/beijing-101010100.html",
            "now": {
                "obsTime": "2024-06-01T13:55+08:00",
                "temp": "24",
                "feelsLike": "26",
                "icon": "305",
                "text": "小雨",
                "wind360": "135",
                "windDir": "东南风",
                "windScale": "2",
                "windSpeed": "9",
                "humidity": "82",
                "precip": "0.6",
                "pressure": "1003",
                "cloud": "91",
                "dew": "20"
            }
        }"#;
        let resp: NowResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.now.text, "小雨");
        assert_eq!(resp.now.precip, "0.6");
        assert_eq!(resp.now.wind360, "135");
        assert_eq!(resp.now.feels_like, "26");
    }

    #[test]
    fn test_hourly_response_tolerates_missing_fields() {
        let json = r#"{
            "code": "200",
            "hourly": [
                {"fxTime": "2024-06-01T15:00+08:00", "text": "阴", "precip": "0.0"}
            ]
        }"#;
        let resp: HourlyResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.hourly.len(), 1);
        assert_eq!(resp.hourly[0].fx_time, "2024-06-01T15:00+08:00");
        assert_eq!(resp.hourly[0].temp, "");
    }

    #[test]
    fn test_lookup_failure_exposes_info() {
        let json = r#"{"code": "404", "info": "no such location", "count": 0, "location": []}"#;
        let resp: CityLookupResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.message(), Some("no such location"));
    }

    #[test]
    fn test_window_none_is_not_ongoing() {
        let window = ForecastWindow::none();
        assert!(!window.will_precipitate);
        assert!(!window.is_ongoing());
    }

    #[test]
    fn test_simulated_window() {
        let window = ForecastWindow::simulated();
        assert!(window.will_precipitate);
        assert!(!window.is_ongoing());
        assert_eq!(window.start, "15:30");
    }
}
