use anyhow::{Context, bail};
use citycast_core::{AppError, Config, Place, WeatherApp};
use clap::{Args, Parser, Subcommand};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City weather with saved favorites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Search places by name.
    Search {
        /// City name, at least 2 characters.
        query: String,
    },

    /// Show weather for a place, coordinates or a saved favorite.
    Show(ShowArgs),

    /// Manage saved cities.
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Place name to search for.
    #[arg(conflicts_with_all = ["lat", "favorite"])]
    pub place: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Display name used with --lat/--lon.
    #[arg(long)]
    pub name: Option<String>,

    /// Id of a saved favorite, as printed by `favorites list`.
    #[arg(long, conflicts_with = "lat")]
    pub favorite: Option<String>,

    /// 1-based search result to use instead of prompting.
    #[arg(long)]
    pub pick: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List saved cities with their last-known temperature.
    List,

    /// Search for a place and save it.
    Add {
        query: String,

        /// 1-based search result to use instead of prompting.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Remove a saved city by id.
    Remove { id: String },

    /// Remove every saved city.
    Clear,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => {
                let places = open_app()?.search(&query).await?;
                print!("{}", output::places(&places));
                Ok(())
            }
            Command::Show(args) => show(&open_app()?, args).await,
            Command::Favorites(cmd) => favorites(&open_app()?, cmd).await,
        }
    }
}

/// Text printed to stderr when a command fails.
///
/// Core errors lead with their short user message and keep the detail below it.
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app_err) => format!("{}\n  {app_err}", app_err.user_message()),
        None => format!("{err:#}"),
    }
}

/// Process exit status: 2 when trying again later may succeed, 1 otherwise.
pub fn failure_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<AppError>() {
        Some(app_err) if app_err.is_recoverable() => 2,
        _ => 1,
    }
}

fn open_app() -> anyhow::Result<WeatherApp> {
    let config = Config::load()?;
    Ok(WeatherApp::from_config(&config)?)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(app: &WeatherApp, args: ShowArgs) -> anyhow::Result<()> {
    let (lat, lon, name) = if let Some(id) = args.favorite {
        app.load_favorites().await?;
        let fav = app
            .favorite(&id)
            .with_context(|| format!("No favorite with id '{id}'. See `citycast favorites list`."))?;
        (fav.lat, fav.lon, Some(fav.name))
    } else if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        (lat, lon, args.name)
    } else if let Some(query) = args.place {
        let place = pick_place(app, &query, args.pick).await?;
        (place.lat, place.lon, Some(place.label()))
    } else {
        bail!("Pass a place name, --lat/--lon, or --favorite <id>");
    };

    let outcome = app.fetch_weather_outcome(lat, lon, name.as_deref()).await;
    let degraded = outcome.is_degraded();
    let snapshot = outcome.into_result()?;

    print!("{}", output::snapshot(&snapshot));
    if degraded {
        println!("(forecast unavailable, showing current conditions only)");
    }
    Ok(())
}

async fn favorites(app: &WeatherApp, cmd: FavoritesCommand) -> anyhow::Result<()> {
    app.load_favorites().await?;

    match cmd {
        FavoritesCommand::List => {
            print!("{}", output::favorites(&app.state().favorites));
        }
        FavoritesCommand::Add { query, pick } => {
            let place = pick_place(app, &query, pick).await?;
            let fav = app.add_favorite(&place).await?;
            println!("Saved {} ({})", fav.name, fav.id);
        }
        FavoritesCommand::Remove { id } => {
            let existed = app.favorite(&id).is_some();
            app.remove_favorite(&id).await?;
            if existed {
                println!("Removed {id}");
            } else {
                println!("No favorite with id {id}");
            }
        }
        FavoritesCommand::Clear => {
            app.clear_favorites().await?;
            println!("Cleared all favorites");
        }
    }

    Ok(())
}

async fn pick_place(app: &WeatherApp, query: &str, pick: Option<usize>) -> anyhow::Result<Place> {
    let mut places = app.search(query).await?;
    if places.is_empty() {
        bail!("No results for '{}'", query.trim());
    }

    let index = match pick {
        Some(n) if (1..=places.len()).contains(&n) => n - 1,
        Some(n) => bail!("--pick {n} is out of range (1..={})", places.len()),
        None if places.len() == 1 => 0,
        None => {
            let labels: Vec<String> = places.iter().map(Place::label).collect();
            inquire::Select::new("Which place?", labels)
                .raw_prompt()
                .context("Failed to read selection")?
                .index
        }
    };

    Ok(places.swap_remove(index))
}
