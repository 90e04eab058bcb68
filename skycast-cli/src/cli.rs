use anyhow::Context;
use clap::{Parser, Subcommand};

use skycast_core::{
    Config, FileStorage, OpenWeatherClient, Preferences, TemperatureUnit, WeatherQuery, locate,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// Show current conditions and the five-day forecast for a city.
    Show {
        /// City name, e.g. "Lisbon" or "Springfield,US".
        city: String,
    },

    /// Show weather for the machine's current location.
    Here,

    /// Like `show`, but keeps the day/night timeline live until Ctrl-C.
    Watch {
        /// City name.
        city: String,
    },

    /// Toggle the preferred temperature unit.
    Unit,

    /// Manage favorite locations.
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// List recent searches, most recent first.
    Recent,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// Star a location.
    Add { name: String },

    /// Unstar a location.
    Remove { name: String },

    /// List starred locations.
    List,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut prefs = Preferences::load(FileStorage::open_default()?);

        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&mut prefs, WeatherQuery::City(city), false).await,
            Command::Here => {
                let Some(coords) = locate::current_position().await else {
                    anyhow::bail!(
                        "Could not determine the current location. Try `skycast show <city>` instead."
                    );
                };
                show(&mut prefs, WeatherQuery::Coords(coords), false).await
            }
            Command::Watch { city } => show(&mut prefs, WeatherQuery::City(city), true).await,
            Command::Unit => {
                prefs.toggle_unit();
                let name = match prefs.unit() {
                    TemperatureUnit::Celsius => "Celsius",
                    TemperatureUnit::Fahrenheit => "Fahrenheit",
                };
                println!("Temperatures will be shown in {name}.");
                Ok(())
            }
            Command::Favorites(cmd) => {
                favorites(&mut prefs, cmd);
                Ok(())
            }
            Command::Recent => {
                render::recent_searches(prefs.recent_searches());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key from prompt")?;

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    prefs: &mut Preferences<FileStorage>,
    query: WeatherQuery,
    watch: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = OpenWeatherClient::new(config.resolve_api_key()?);

    let bundle = match client.fetch_weather(&query).await {
        Ok(bundle) => bundle,
        Err(err) if err.is_location_not_found() => {
            anyhow::bail!("City not found. Please try another location.")
        }
        Err(err) => {
            return Err(err).context("Failed to fetch weather data. Please try again.");
        }
    };

    // A search only counts once it resolved to a real place.
    if let WeatherQuery::City(name) = &query {
        prefs.record_search(name);
    }

    render::weather(&bundle, prefs.unit());

    if watch {
        render::live_timeline(&bundle).await;
    } else {
        render::timeline_once(&bundle);
    }

    Ok(())
}

fn favorites(prefs: &mut Preferences<FileStorage>, cmd: FavoritesCommand) {
    match cmd {
        FavoritesCommand::Add { name } => {
            prefs.add_favorite(&name);
            println!("Starred {name}.");
        }
        FavoritesCommand::Remove { name } => {
            prefs.remove_favorite(&name);
            println!("Removed {name}.");
        }
        FavoritesCommand::List => render::favorites(prefs.favorites()),
    }
}
