//! Alert text rendered from a reading and its forecast window.

use raincheck_weather::{ForecastWindow, Observation};

pub const ALERT_TITLE: &str = "☔️ Precipitation alert";

/// Link opened when the notification is tapped.
pub const ALERT_LINK: &str = "https://www.qweather.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl Notification {
    /// Build the alert for `location`.
    ///
    /// An ongoing window describes what is falling now; any other window describes
    /// when precipitation is expected to start.
    pub fn precipitation_alert(location: &str, now: &Observation, window: &ForecastWindow) -> Self {
        let detail = intensity_clause(window);

        let body = if window.is_ongoing() {
            format!(
                "{} {}, {}°C{}. Take an umbrella!",
                location, now.text, now.temp, detail
            )
        } else {
            format!(
                "{}: {} expected from {}{}. Now: {}, {}°C. Bring an umbrella!",
                location, window.weather_type, window.start, detail, now.text, now.temp
            )
        };

        Self {
            title: ALERT_TITLE.to_string(),
            body,
            url: ALERT_LINK.to_string(),
        }
    }
}

/// `", <intensity> (<amount>)"`, dropping whichever parts are empty.
fn intensity_clause(window: &ForecastWindow) -> String {
    match (window.intensity.is_empty(), window.amount.is_empty()) {
        (false, false) => format!(", {} ({})", window.intensity, window.amount),
        (false, true) => format!(", {}", window.intensity),
        (true, false) => format!(" ({})", window.amount),
        (true, true) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(text: &str, temp: &str) -> Observation {
        Observation {
            text: text.to_string(),
            temp: temp.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_forecast_alert_body() {
        let window = ForecastWindow {
            will_precipitate: true,
            start: "14:00".to_string(),
            end: "15:00".to_string(),
            weather_type: "中雨".to_string(),
            intensity: "light".to_string(),
            amount: "2.4mm".to_string(),
        };
        let n = Notification::precipitation_alert("北京", &observation("多云", "24"), &window);

        assert_eq!(n.title, "☔️ Precipitation alert");
        assert_eq!(
            n.body,
            "北京: 中雨 expected from 14:00, light (2.4mm). Now: 多云, 24°C. Bring an umbrella!"
        );
        assert_eq!(n.url, "https://www.qweather.com/");
    }

    #[test]
    fn test_ongoing_alert_body() {
        let window = ForecastWindow {
            will_precipitate: true,
            start: "now".to_string(),
            end: "ongoing".to_string(),
            weather_type: "小雨".to_string(),
            intensity: "current precipitation".to_string(),
            amount: "0.6mm".to_string(),
        };
        let n = Notification::precipitation_alert("上海", &observation("小雨", "19"), &window);

        assert_eq!(
            n.body,
            "上海 小雨, 19°C, current precipitation (0.6mm). Take an umbrella!"
        );
    }

    #[test]
    fn test_keyword_only_window_omits_intensity() {
        let window = ForecastWindow {
            will_precipitate: true,
            start: "13:00".to_string(),
            end: "13:00".to_string(),
            weather_type: "小雪".to_string(),
            ..Default::default()
        };
        let n = Notification::precipitation_alert("哈尔滨", &observation("阴", "-3"), &window);

        assert_eq!(
            n.body,
            "哈尔滨: 小雪 expected from 13:00. Now: 阴, -3°C. Bring an umbrella!"
        );
    }

    #[test]
    fn test_simulated_window_renders() {
        let n = Notification::precipitation_alert(
            "Beijing",
            &observation("Cloudy", "21"),
            &ForecastWindow::simulated(),
        );
        assert!(n.body.contains("light rain expected from 15:30, light to moderate (5-15mm)"));
    }
}
