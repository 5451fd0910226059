//! Reduces an hourly series into a single precipitation window.
//!
//! Hits inside the horizon are collected without requiring them to be adjacent: two wet
//! hours with a dry hour between them still produce one window spanning both. The window
//! therefore says "precipitation somewhere between start and end", not "continuously".

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::classify::{is_precipitating, parse_amount};
use crate::types::{
    CompositeReading, ForecastWindow, HourlyEntry, Intensity, CURRENT_INTENSITY_LABEL, NOW_LABEL,
    ONGOING_LABEL,
};

/// Look-ahead horizon in hours.
pub const DEFAULT_HORIZON_HOURS: i64 = 3;

/// Provider hourly timestamp layout, e.g. `2024-06-01T15:00+08:00`.
pub const FX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

const TIME_LABEL_FORMAT: &str = "%H:%M";
const AMOUNT_UNIT: &str = "mm";

pub fn default_horizon() -> Duration {
    Duration::hours(DEFAULT_HORIZON_HOURS)
}

/// Parse an hourly `fxTime`, keeping the provider's offset.
pub fn parse_fx_time(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, FX_TIME_FORMAT).ok()
}

struct Hit<'a> {
    time: DateTime<FixedOffset>,
    entry: &'a HourlyEntry,
}

/// Summarise precipitation expected in `(now, now + horizon]`.
///
/// If the reading says it is already precipitating, the hourly series is ignored and an
/// ongoing window describing current conditions is returned.
pub fn aggregate(reading: &CompositeReading, horizon: Duration, now: DateTime<Utc>) -> ForecastWindow {
    if reading.currently_precipitating {
        return ForecastWindow {
            will_precipitate: true,
            start: NOW_LABEL.to_string(),
            end: ONGOING_LABEL.to_string(),
            weather_type: reading.now.text.clone(),
            intensity: CURRENT_INTENSITY_LABEL.to_string(),
            amount: format!("{}{}", reading.now.precip, AMOUNT_UNIT),
        };
    }

    let hits = collect_hits(&reading.hourly, horizon, now);
    let (Some(first), Some(last)) = (hits.first(), hits.last()) else {
        return ForecastWindow::none();
    };

    let total: f64 = hits
        .iter()
        .filter_map(|hit| parse_amount(&hit.entry.precip))
        .sum();

    // Divide by every hit, not only the ones with a numeric amount.
    let (intensity, amount) = if total > 0.0 {
        let rendered = format!("{:.1}", total / hits.len() as f64);
        // Tier comes from the rendered value so the label agrees with what is shown.
        let average: f64 = rendered.parse().unwrap_or_default();
        (
            Intensity::from_average_mm(average).label().to_string(),
            format!("{}{}", rendered, AMOUNT_UNIT),
        )
    } else {
        (String::new(), String::new())
    };

    ForecastWindow {
        will_precipitate: true,
        start: first.time.format(TIME_LABEL_FORMAT).to_string(),
        end: last.time.format(TIME_LABEL_FORMAT).to_string(),
        weather_type: dominant_weather_type(&hits),
        intensity,
        amount,
    }
}

fn collect_hits(hourly: &[HourlyEntry], horizon: Duration, now: DateTime<Utc>) -> Vec<Hit<'_>> {
    let mut hits = Vec::new();

    for entry in hourly {
        let Some(time) = parse_fx_time(&entry.fx_time) else {
            tracing::warn!("Skipping hourly entry with unparseable time {:?}", entry.fx_time);
            continue;
        };

        let ahead = time.with_timezone(&Utc) - now;
        if ahead <= Duration::zero() || ahead > horizon {
            continue;
        }

        tracing::debug!(
            "In horizon: {} ({}, {}mm), {} min ahead",
            entry.fx_time,
            entry.text,
            entry.precip,
            ahead.num_minutes()
        );

        if is_precipitating(&entry.text, &entry.precip) {
            tracing::debug!("Precipitation expected at {}: {}", entry.fx_time, entry.text);
            hits.push(Hit { time, entry });
        }
    }

    hits
}

/// Most frequent description. On a tie the description seen first wins.
fn dominant_weather_type(hits: &[Hit<'_>]) -> String {
    // Insertion-ordered counts; a map's iteration order would make ties unstable.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for hit in hits {
        let text = hit.entry.text.as_str();
        match counts.iter_mut().find(|slot| slot.0 == text) {
            Some(slot) => slot.1 += 1,
            None => counts.push((text, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (text, count) in counts {
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((text, count));
        }
    }

    best.map(|(text, _)| text.to_string()).unwrap_or_default()
}
