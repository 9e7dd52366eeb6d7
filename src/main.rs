use std::path::PathBuf;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use log::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use food_map::config::Config;
use food_map::food::FoodRequestClient;
use food_map::geocode::GeocodeClient;
use food_map::geocode::model::LatLng;
use food_map::record::save_records;
use food_map::session::MapSession;
use food_map::view::MapProps;

/// Show a map position with its resolved address next to the open food requests.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// latitude of the map center; leave out together with --lng when unknown
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,
    #[arg(long, default_value_t = 15)]
    zoom: u8,
    #[arg(long, default_value = "400px")]
    height: String,
    /// base URL of the food-request service
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,
    #[arg(long, env = "MAP_API_KEY", hide_env_values = true)]
    map_api_key: Option<String>,
    /// reverse geocoding endpoint
    #[arg(long, env = "GEOCODE_URL")]
    geocode_url: Option<String>,
    /// also write the fetched food requests to this CSV file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    // a missing .env file is fine, the environment may be set already
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    run(cli).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default())
        .init();
}

async fn run(cli: Cli) -> color_eyre::Result<()> {
    let config = Config::new(cli.api_url, cli.map_api_key, cli.geocode_url)
        .wrap_err("invalid configuration")?;
    let geocoder = GeocodeClient::new(&config)?;
    let fetcher = FoodRequestClient::new(&config)?;

    let center = cli.lat.zip(cli.lng).map(|(lat, lng)| LatLng::new(lat, lng));
    let mut session = MapSession::new(MapProps {
        center,
        zoom: cli.zoom,
        height: cli.height,
    });

    let completions = session.start(geocoder, fetcher);
    let mut stdout = std::io::stdout().lock();
    session.run(completions, &mut stdout).await?;

    let requests = session.teardown();
    if let Some(path) = cli.export {
        info!("saving [{}] food requests to [{}]", requests.len(), path.display());
        save_records(requests.items(), &path)?;
    }
    Ok(())
}
