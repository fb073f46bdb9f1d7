//! Skylark command-line front end
//!
//! Usage:
//!   skylark search <query>             # List matching places
//!   skylark search <query> --save 2    # ...and save the 2nd match
//!   skylark weather                    # Weather for the saved place
//!   skylark weather --lng X --lat Y    # Weather for explicit coordinates
//!   skylark saved                      # Show the saved place

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use tokio::runtime::Handle;

use skylark_core::{AppContext, AppError};
use skylark_weather::{Location, PlaceStore, Repository, Weather, WeatherClient, WeatherError};

/// Skylark - place search and weather forecasts
#[derive(FromArgs)]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Search(SearchArgs),
    Weather(WeatherArgs),
    Saved(SavedArgs),
}

/// Search places by name
#[derive(FromArgs)]
#[argh(subcommand, name = "search")]
struct SearchArgs {
    /// place name to look up
    #[argh(positional)]
    query: String,

    /// save the n-th match (1-based) as the current place
    #[argh(option)]
    save: Option<usize>,
}

/// Show realtime conditions and the daily forecast
#[derive(FromArgs)]
#[argh(subcommand, name = "weather")]
struct WeatherArgs {
    /// longitude (defaults to the saved place)
    #[argh(option)]
    lng: Option<String>,

    /// latitude (defaults to the saved place)
    #[argh(option)]
    lat: Option<String>,
}

/// Show the saved place
#[derive(FromArgs)]
#[argh(subcommand, name = "saved")]
struct SavedArgs {}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    skylark_core::init()?;

    let ctx = AppContext::load().map_err(|e| report(AppError::classify(e)))?;
    let api = &ctx.config().api;
    let client = WeatherClient::from_config(api).map_err(|e| report(AppError::classify(e)))?;
    let repository = Repository::new(
        client,
        PlaceStore::new(ctx.preferences()),
        Handle::current(),
    );

    tracing::debug!("Skylark started");

    match args.command {
        Command::Search(args) => {
            api.require_token().map_err(report)?;
            search(&repository, args).await
        }
        Command::Weather(args) => {
            api.require_token().map_err(report)?;
            weather(&repository, args).await
        }
        Command::Saved(_) => saved(&repository),
    }
}

async fn search(repository: &Repository, args: SearchArgs) -> Result<()> {
    let places = repository
        .search_places(&args.query)
        .recv()
        .await
        .map_err(report)?;

    if places.is_empty() {
        println!("No places found for '{}'", args.query);
        return Ok(());
    }

    for (i, place) in places.iter().enumerate() {
        println!("{:>3}. {} ({})", i + 1, place.name, place.address);
    }

    if let Some(n) = args.save {
        let place = n
            .checked_sub(1)
            .and_then(|i| places.get(i))
            .with_context(|| format!("No match #{} (found {})", n, places.len()))?;
        repository.save_place(place).map_err(report)?;
        println!("\nSaved {}", place.name);
    }

    Ok(())
}

async fn weather(repository: &Repository, args: WeatherArgs) -> Result<()> {
    let (title, location) = match (args.lng, args.lat) {
        (Some(lng), Some(lat)) => (format!("{},{}", lng, lat), Location::new(lng, lat)),
        (None, None) => {
            if !repository.is_place_saved() {
                bail!("No saved place. Save one with `skylark search <query> --save <n>`");
            }
            let place = repository.saved_place().map_err(report)?;
            (place.name, place.location)
        }
        _ => bail!("--lng and --lat must be given together"),
    };

    let weather = repository
        .refresh_weather(&location.lng, &location.lat)
        .recv()
        .await
        .map_err(report)?;

    print_weather(&title, &weather);
    Ok(())
}

fn saved(repository: &Repository) -> Result<()> {
    match repository.saved_place() {
        Ok(place) => {
            println!("{}", place.name);
            println!("  {}", place.address);
            println!("  lng {}, lat {}", place.location.lng, place.location.lat);
            Ok(())
        }
        Err(WeatherError::NotFound(_)) => {
            println!("No place saved yet");
            Ok(())
        }
        Err(e) => Err(report(e)),
    }
}

fn print_weather(title: &str, weather: &Weather) {
    let now = &weather.realtime;
    println!("{}", title);
    println!(
        "  Now: {:.0}°C, {} (AQI {:.0})",
        now.temperature,
        now.sky().description(),
        now.air_quality.aqi.chn
    );

    println!();
    for day in weather.daily.days() {
        let date = day
            .date
            .map(|d| d.format("%a %m-%d").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {:<10} {:<20} {:>4.0}° / {:.0}°",
            date,
            day.sky.description(),
            day.max,
            day.min
        );
    }

    let life = &weather.daily.life_index;
    let today = |entries: &[skylark_weather::types::LifeDescription]| {
        entries
            .first()
            .map(|e| e.desc.clone())
            .unwrap_or_else(|| "-".to_string())
    };
    println!();
    println!("  Cold risk:   {}", today(&life.cold_risk));
    println!("  Dressing:    {}", today(&life.dressing));
    println!("  UV:          {}", today(&life.ultraviolet));
    println!("  Car washing: {}", today(&life.car_washing));
}

fn report(error: impl Into<AppError>) -> anyhow::Error {
    let error = error.into();
    tracing::error!("{}", error);
    anyhow::anyhow!("{} ({})", error.user_message(), error)
}
