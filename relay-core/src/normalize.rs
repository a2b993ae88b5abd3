//! Pure reshaping of upstream payloads into the relay's output schema.
//!
//! Nothing here performs I/O, so every rule can be exercised directly with
//! hand-built payloads.

use crate::{
    error::WeatherError,
    model::{CurrentConditions, DailyForecastEntry},
    provider::openweather::{OwCurrentResponse, OwForecastResponse, OwForecastSample},
};

/// Upper bound on daily forecast entries in a report.
pub const MAX_DAILY_ENTRIES: usize = 5;

/// Round to one decimal place. Monotonic: `a <= b` implies `round1(a) <= round1(b)`.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Upper-case the first character and lower-case the rest ("ясно" -> "Ясно").
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn current_conditions(raw: OwCurrentResponse) -> Result<CurrentConditions, WeatherError> {
    let weather = raw
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::malformed("current weather", "empty `weather` list"))?;

    let wind_speed = raw.wind.and_then(|w| w.speed).unwrap_or(0.0);

    Ok(CurrentConditions {
        temperature: round1(raw.main.temp),
        feels_like: round1(raw.main.feels_like),
        humidity: raw.main.humidity,
        pressure: raw.main.pressure,
        wind_speed,
        description: capitalize(&weather.description),
        icon: weather.icon,
    })
}

/// Primary rule: every sample stamped at noon, in original order.
pub fn noon_samples<'a, T>(samples: &'a [T], is_noon: impl Fn(&T) -> bool) -> Vec<&'a T> {
    samples.iter().filter(|s| is_noon(*s)).collect()
}

/// Fallback rule: the leading samples, unfiltered.
pub fn leading_samples<T>(samples: &[T]) -> Vec<&T> {
    samples.iter().take(MAX_DAILY_ENTRIES).collect()
}

/// Pick one representative sample per day.
///
/// The noon rule wins whenever it matches anything; the fallback is never
/// mixed in. The result never exceeds [`MAX_DAILY_ENTRIES`].
pub fn select_daily<'a, T>(samples: &'a [T], is_noon: impl Fn(&T) -> bool) -> Vec<&'a T> {
    let mut picked = noon_samples(samples, is_noon);
    if picked.is_empty() {
        picked = leading_samples(samples);
    }
    picked.truncate(MAX_DAILY_ENTRIES);
    picked
}

pub fn daily_entry(sample: &OwForecastSample) -> Result<DailyForecastEntry, WeatherError> {
    if sample.is_malformed() {
        return Err(WeatherError::malformed(
            "forecast",
            "sample matches neither the 3-hourly nor the daily shape",
        ));
    }
    let (Some(dt), Some((temp, min, max))) = (sample.dt(), sample.temperatures()) else {
        return Err(WeatherError::malformed("forecast", "sample without temperatures"));
    };
    let weather = sample
        .conditions()
        .ok_or_else(|| WeatherError::malformed("forecast", "sample without `weather`"))?;

    Ok(DailyForecastEntry {
        dt,
        temperature: round1(temp),
        min: round1(min),
        max: round1(max),
        description: capitalize(&weather.description),
        icon: weather.icon.clone(),
    })
}

pub fn daily_forecast(raw: &OwForecastResponse) -> Result<Vec<DailyForecastEntry>, WeatherError> {
    select_daily(&raw.list, OwForecastSample::is_noon)
        .into_iter()
        .map(daily_entry)
        .collect()
}
