use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tokio::net::TcpListener;
use weather_relay::{AppState, build_app};
use weather_relay_core::{Config, Coordinate, LocationQuery, WeatherNormalizer, WeatherReport};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-relay", version, about = "Weather relay backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP relay.
    Serve {
        /// Address to listen on; overrides the config file and WEATHER_RELAY_BIND.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the OpenWeather API key and description locale.
    Configure,

    /// Fetch one report and print it.
    Show {
        /// City name; omit when passing --lat/--lon.
        #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => serve(bind).await,
            Command::Configure => configure(),
            Command::Show { city, lat, lon } => {
                let query = match (city, lat, lon) {
                    (Some(city), _, _) => LocationQuery::City(city),
                    (None, Some(lat), Some(lon)) => {
                        LocationQuery::Coordinate(Coordinate::new(lat, lon))
                    }
                    _ => bail!("Pass a city name or both --lat and --lon."),
                };
                show(query).await
            }
        }
    }
}

async fn serve(bind: Option<String>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());

    let normalizer = WeatherNormalizer::from_config(&config)?;
    if !normalizer.is_configured() {
        tracing::warn!("OpenWeather API key is missing; weather requests will fail until it is set");
    }

    let app = build_app(AppState { normalizer }, &config.server.allowed_origins);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty.");
    }

    let lang = Text::new("Description language:")
        .with_default(&config.upstream.lang)
        .prompt()
        .context("Failed to read language")?;

    config.set_api_key(api_key.trim().to_string());
    config.upstream.lang = lang.trim().to_string();

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(query: LocationQuery) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let normalizer = WeatherNormalizer::from_config(&config)?;
    let report = normalizer.get_weather_report(&query).await?;
    print!("{}", render_report(&report));
    Ok(())
}

/// Human-readable rendering of a report.
pub fn render_report(report: &WeatherReport) -> String {
    let current = &report.current;
    let mut out = format!(
        "{} ({:.4}, {:.4})\n\
         Now: {:.1}°C (feels like {:.1}°C), {}\n\
         Humidity {}%, pressure {} hPa, wind {} m/s\n",
        report.location.name,
        report.location.coordinate.lat,
        report.location.coordinate.lon,
        current.temperature,
        current.feels_like,
        current.description,
        current.humidity,
        current.pressure,
        current.wind_speed,
    );

    if report.daily.is_empty() {
        out.push_str("Forecast unavailable\n");
    }
    for day in &report.daily {
        let date = day
            .date()
            .map(|d| d.format("%a %d %b").to_string())
            .unwrap_or_else(|| day.dt.to_string());
        out.push_str(&format!(
            "{date}: {:.1}°C ({:.1}..{:.1}), {}\n",
            day.temperature, day.min, day.max, day.description
        ));
    }
    out
}
