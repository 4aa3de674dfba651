//! RouteRain CLI
//!
//! Command-line interface for rain verdicts at points and along routes,
//! and for street geometry lookups.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::{Context, bail};
use application::{ConfiguredProvider, RainWeatherService, RouteSampler, WeatherCache};
use clap::{Parser, Subcommand};
use domain::entities::AggregatedWeather;
use domain::value_objects::{GeoBounds, GeoPoint};
use integration_overpass::{OverpassClient, OverpassConfig};
use integration_weather::{
    OpenWeatherMapClient, OpenWeatherMapConfig, TomorrowIoClient, TomorrowIoConfig,
    WeatherApiClient, WeatherApiConfig,
};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// RouteRain CLI
#[derive(Parser)]
#[command(name = "routerain-cli")]
#[command(author, version, about = "Rain verdicts for points and routes", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHERMAP_API_KEY", global = true, hide_env_values = true)]
    openweathermap_key: Option<String>,

    /// WeatherAPI.com API key
    #[arg(long, env = "WEATHERAPI_KEY", global = true, hide_env_values = true)]
    weatherapi_key: Option<String>,

    /// Tomorrow.io API key
    #[arg(long, env = "TOMORROW_API_KEY", global = true, hide_env_values = true)]
    tomorrow_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rain verdict for a single coordinate
    ///
    /// Example: routerain-cli point --lat 19.076 --lon 72.8777
    Point {
        /// Latitude in degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long)]
        lon: f64,
    },

    /// Rain verdicts along a route polyline
    ///
    /// Example: routerain-cli route --points "19.07,72.87;19.08,72.88;19.09,72.89"
    Route {
        /// Semicolon-separated "lat,lon" vertices
        #[arg(long)]
        points: String,
    },

    /// Named streets within a bounding box
    ///
    /// Example: routerain-cli streets --bbox "18.9,72.7,19.3,73.1"
    Streets {
        /// Bounding box as "south,west,north,east" in degrees
        #[arg(long)]
        bbox: String,

        /// Overpass API base URL
        #[arg(long, default_value = "https://overpass-api.de/api")]
        overpass_url: String,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Parse a "lat,lon" pair
fn parse_point(input: &str) -> anyhow::Result<GeoPoint> {
    let (lat, lon) = input
        .trim()
        .split_once(',')
        .context("expected \"lat,lon\"")?;
    let lat: f64 = lat.trim().parse().context("invalid latitude")?;
    let lon: f64 = lon.trim().parse().context("invalid longitude")?;
    Ok(GeoPoint::new(lat, lon)?)
}

/// Parse a semicolon-separated list of "lat,lon" pairs
fn parse_route(input: &str) -> anyhow::Result<Vec<GeoPoint>> {
    input
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(parse_point)
        .collect()
}

/// Parse a "south,west,north,east" bounding box
fn parse_bounds(input: &str) -> anyhow::Result<GeoBounds> {
    let edges: Vec<f64> = input
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .context("bounding box edges must be numbers")?;
    if edges.len() != 4 {
        bail!("expected \"south,west,north,east\"");
    }
    Ok(GeoBounds::new(edges[0], edges[1], edges[2], edges[3])?)
}

/// Build the weather service from whichever provider keys are configured
fn build_weather_service(cli: &Cli) -> anyhow::Result<RainWeatherService> {
    let mut providers = Vec::new();

    if let Some(key) = &cli.openweathermap_key {
        let client = OpenWeatherMapClient::new(OpenWeatherMapConfig::with_api_key(key.clone()))
            .context("Failed to create OpenWeatherMap client")?;
        providers.push(ConfiguredProvider::new(Arc::new(client)));
    } else {
        warn!("OPENWEATHERMAP_API_KEY not set, skipping OpenWeatherMap");
    }

    if let Some(key) = &cli.weatherapi_key {
        let client = WeatherApiClient::new(WeatherApiConfig::with_api_key(key.clone()))
            .context("Failed to create WeatherAPI client")?;
        providers.push(ConfiguredProvider::new(Arc::new(client)));
    } else {
        warn!("WEATHERAPI_KEY not set, skipping WeatherAPI");
    }

    if let Some(key) = &cli.tomorrow_key {
        let client = TomorrowIoClient::new(TomorrowIoConfig::with_api_key(key.clone()))
            .context("Failed to create Tomorrow.io client")?;
        providers.push(ConfiguredProvider::new(Arc::new(client)));
    } else {
        warn!("TOMORROW_API_KEY not set, skipping Tomorrow.io");
    }

    if providers.is_empty() {
        bail!("No provider API keys configured. Set at least one of OPENWEATHERMAP_API_KEY, WEATHERAPI_KEY, TOMORROW_API_KEY");
    }

    Ok(RainWeatherService::new(
        providers,
        WeatherCache::new(),
        RouteSampler::default(),
    ))
}

fn print_verdict(weather: &AggregatedWeather) {
    if weather.is_raining {
        println!("🌧️  Raining (confidence {:.1}%)", weather.confidence);
    } else {
        println!("☀️  Dry (rain share {:.1}%)", weather.confidence);
    }
    println!("   Conditions: {}", weather.description);
    if let Some(temp) = weather.temperature {
        println!("   Temperature: {temp:.1}°C");
    }
    if let Some(humidity) = weather.humidity {
        println!("   Humidity: {humidity}%");
    }
    if let Some(wind) = weather.wind_speed {
        println!("   Wind: {wind:.1} km/h");
    }
    println!("   Sources: {}", weather.sources);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &cli.command {
        Commands::Point { lat, lon } => {
            let service = build_weather_service(&cli)?;
            let point = GeoPoint::new(*lat, *lon)?;

            match service.weather_at(point).await {
                Some(weather) => print_verdict(&weather),
                None => {
                    println!("❓ No provider answered for {point}");
                    std::process::exit(1);
                },
            }
        },

        Commands::Route { points } => {
            let service = build_weather_service(&cli)?;
            let path = parse_route(points)?;
            if path.is_empty() {
                bail!("Route must contain at least one \"lat,lon\" vertex");
            }

            let samples = service.route_weather(&path).await;
            let raining = samples.iter().filter(|s| s.is_raining()).count();
            let distance_km: f64 = path.windows(2).map(|w| w[0].distance_km(&w[1])).sum();

            println!(
                "🗺️  {:.1} km, {} vertices sampled to {} points",
                distance_km,
                path.len(),
                samples.len()
            );
            for sample in &samples {
                let marker = match &sample.weather {
                    Some(w) if w.is_raining => "🌧️ ",
                    Some(_) => "☀️ ",
                    None => "❓",
                };
                println!("   {marker} {}", sample.point);
            }

            if raining > 0 {
                println!("🌧️  Rain on {raining} of {} sampled points", samples.len());
            } else {
                println!("☀️  No rain along the route");
            }
        },

        Commands::Streets { bbox, overpass_url } => {
            let bounds = parse_bounds(bbox)?;
            let config = OverpassConfig {
                base_url: overpass_url.clone(),
                ..OverpassConfig::default()
            };
            let client = OverpassClient::new(config)?;

            let network = client.fetch_streets(bounds).await?;
            println!("🛣️  {} named streets in {bounds}", network.len());
            for street in &network.streets {
                println!("   {} ({} vertices)", street.name, street.geometry.len());
            }
        },
    }

    Ok(())
}
