use colored::*;
use eyre::{Context, Result};
use std::fs;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::{Config, LogLevel, ReselectPolicy};

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
        ConfigAction::Set { key, value } => set(&key, &value, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "Jingjie Configuration".bold());
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!();

            println!("{}:", "paths".cyan());
            println!("  logs: {}", config.paths.logs.display());
            println!();

            println!("{}:", "narrative".cyan());
            println!("  api_key_env: {}", config.narrative.api_key_env);
            println!("  model: {}", config.narrative.model);
            println!("  endpoint: {}", config.narrative.endpoint);
            println!();

            println!("{}:", "timing".cyan());
            println!("  tick_interval_ms: {}", config.timing.tick_interval_ms);
            println!("  traversal_delay_ms: {}", config.timing.traversal_delay_ms);
            println!();

            println!("{}:", "selection".cyan());
            println!("  reselect_policy: {}", policy_name(config.selection.reselect_policy));
        }
    }

    Ok(())
}

fn policy_name(policy: ReselectPolicy) -> &'static str {
    match policy {
        ReselectPolicy::Ignore => "ignore",
        ReselectPolicy::Cancel => "cancel",
    }
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        "paths.logs" => Some(config.paths.logs.display().to_string()),
        "narrative.api_key_env" => Some(config.narrative.api_key_env.clone()),
        "narrative.model" => Some(config.narrative.model.clone()),
        "narrative.endpoint" => Some(config.narrative.endpoint.clone()),
        "timing.tick_interval_ms" => Some(config.timing.tick_interval_ms.to_string()),
        "timing.traversal_delay_ms" => Some(config.timing.traversal_delay_ms.to_string()),
        "selection.reselect_policy" => Some(policy_name(config.selection.reselect_policy).to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}

/// Copy of `config` with one key changed
fn apply(key: &str, value: &str, config: &Config) -> Result<Config> {
    let mut new_config = config.clone();

    match key {
        "log_level" | "log-level" => {
            new_config.log_level = serde_yaml::from_str::<LogLevel>(value)
                .context("Invalid log level (use trace, debug, info, warn, error or off)")?;
        }
        "paths.logs" => new_config.paths.logs = value.into(),
        "narrative.api_key_env" => new_config.narrative.api_key_env = value.to_string(),
        "narrative.model" => new_config.narrative.model = value.to_string(),
        "narrative.endpoint" => new_config.narrative.endpoint = value.trim_end_matches('/').to_string(),
        "timing.tick_interval_ms" => {
            new_config.timing.tick_interval_ms = value.parse().context("Invalid number of milliseconds")?;
        }
        "timing.traversal_delay_ms" => {
            new_config.timing.traversal_delay_ms = value.parse().context("Invalid number of milliseconds")?;
        }
        "selection.reselect_policy" => {
            new_config.selection.reselect_policy = serde_yaml::from_str::<ReselectPolicy>(value)
                .context("Invalid reselect policy (use 'ignore' or 'cancel')")?;
        }
        _ => {
            eyre::bail!("Unknown config key: {}", key);
        }
    }

    Ok(new_config)
}

fn set(key: &str, value: &str, config: &Config) -> Result<()> {
    println!("{} Setting {} = {}", "→".blue(), key.cyan(), value.green());

    let new_config = apply(key, value, config)?;

    let config_path = Config::jingjie_dir().join("jingjie.yaml");
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml_str = serde_yaml::to_string(&new_config).context("Failed to serialize config")?;
    fs::write(&config_path, yaml_str).context("Failed to write config file")?;

    println!("  {} Saved to {}", "✓".green(), config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_keys() {
        let config = Config::default();
        assert_eq!(lookup("timing.traversal_delay_ms", &config).as_deref(), Some("2000"));
        assert_eq!(lookup("selection.reselect_policy", &config).as_deref(), Some("ignore"));
        assert_eq!(lookup("narrative.model", &config).as_deref(), Some("gemini-2.5-flash"));
        assert!(lookup("hooks.security_enabled", &config).is_none());
    }

    #[test]
    fn test_apply_parses_values() {
        let config = Config::default();
        let updated = apply("selection.reselect_policy", "cancel", &config).unwrap();
        assert_eq!(updated.selection.reselect_policy, ReselectPolicy::Cancel);

        let updated = apply("log_level", "debug", &config).unwrap();
        assert_eq!(updated.log_level, LogLevel::Debug);

        let updated = apply("timing.tick_interval_ms", "500", &config).unwrap();
        assert_eq!(updated.timing.tick_interval_ms, 500);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let config = Config::default();
        assert!(apply("timing.tick_interval_ms", "soon", &config).is_err());
        assert!(apply("selection.reselect_policy", "maybe", &config).is_err());
        assert!(apply("nope", "1", &config).is_err());
    }
}
