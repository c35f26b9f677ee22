//! Configuration validation command handler.

use chrono::Utc;

use crate::adapter::inbound::cli::command::ConfigArg;
use crate::adapter::inbound::cli::{load_config, output, resolve_config_path};
use crate::error::Result;
use crate::infrastructure::config::polling::WEATHER_KEY_ENV;

/// Validate the configuration without starting the engine.
pub fn execute_config(args: &ConfigArg) -> Result<()> {
    let path = resolve_config_path(args.config.as_deref());
    let config = load_config(args.config.as_deref())?;
    let catalog = config.catalog()?;
    let inputs = config.prediction_inputs()?;

    output::section("Configuration Check");
    match &path {
        Some(path) => output::field("Config", path.display()),
        None => output::field("Config", "built-in defaults"),
    }
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("Channel", &config.channel.url);
    output::field("API", &config.api.url);
    output::field("Rounds", catalog.len());
    output::field("Grid", inputs.qualifying().len());
    output::field("Session", config.session(catalog.first().id()).kind);

    let next = catalog.lookup_next(Utc::now());
    output::field("Next", format!("R{} {}", next.id(), next.name()));

    if !config.weather.enabled {
        output::field("Weather", "disabled");
    } else if config.weather.active_key().is_some() {
        output::success("OpenWeather key detected");
    } else {
        output::warning(&format!(
            "Weather enabled but {WEATHER_KEY_ENV} is not set; weather and relocation are off"
        ));
    }

    if inputs.qualifying().is_empty() {
        output::hint("add [[qualifying]] entries to enable predictions");
    }

    output::success("Configuration check complete");
    Ok(())
}
