use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use weatherblock_core::{Config, WeatherService};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherblock", version, about = "Weather Block CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key used for fetches.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London".
        city: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_owned();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("API key saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    config.apply_env();

    let service = WeatherService::from_config(&config)?;

    // One-shot process: the client key only matters for long-lived callers.
    let snapshot = match service.fetch_weather(city, "cli").await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("weather data unavailable: {err}");
            std::process::exit(1);
        }
    };

    println!("{}, {}", snapshot.city, snapshot.description);
    println!("  temperature: {:.1} F", snapshot.temperature_f);
    println!("  humidity:    {} %", snapshot.humidity_pct);
    println!("  wind:        {:.1} mph", snapshot.wind_speed_mph);
    println!("  icon:        {}", snapshot.icon_url);
    println!(
        "  observed:    {}",
        snapshot.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    );
    Ok(())
}
