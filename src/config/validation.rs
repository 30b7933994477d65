use anyhow::Result;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use garde::Validate;

use super::AppConfig;

/// Values that are opaque text even when they look like numbers. The `Env`
/// provider parses `007` as `7`, so the raw variable is layered on top.
const RAW_ENV_KEYS: &[(&str, &str)] = &[
    ("APP_AUTH__API_TOKEN", "auth.api_token"),
    ("APP_DATABASE__URL", "database.url"),
];

#[derive(Parser, Clone, Debug, Default)]
#[command(name = "bookmarks-api", version, about = "Bookmarks REST API")]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, env = "APP_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Server port
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Environment name
    #[arg(long, env = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Bookmark database connection target
    #[arg(long, env = "DB_URL")]
    pub db_url: Option<String>,

    /// Bearer token clients must present
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Load configuration from process arguments and environment
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&Cli::parse())
}

/// Layered load, lowest priority first:
/// embedded defaults, `config/default.toml`, `config/{environment}.toml`,
/// an explicit `--config` file, `APP_` environment variables, CLI flags.
pub fn load_config_from(cli: &Cli) -> Result<AppConfig> {
    let env_name = cli.environment.clone().unwrap_or_else(|| {
        std::env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string())
    });

    let mut figment = Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file("config/default.toml"))
        .merge(Toml::file(format!("config/{}.toml", env_name)));

    if let Some(path) = &cli.config {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("APP_").split("__"));
    for (var, key) in RAW_ENV_KEYS {
        if let Ok(raw) = std::env::var(var) {
            figment = figment.merge(Serialized::default(key, raw));
        }
    }
    figment = figment.merge(Serialized::default("environment", env_name.to_lowercase()));

    figment = apply_cli_overrides(figment, cli);

    let config: AppConfig = figment.extract()?;
    config.validate()?;

    Ok(config)
}

fn apply_cli_overrides(mut figment: Figment, cli: &Cli) -> Figment {
    if let Some(port) = cli.port {
        figment = figment.merge(Serialized::default("server.port", port));
    }
    if let Some(url) = &cli.db_url {
        figment = figment.merge(Serialized::default("database.url", url));
    }
    if let Some(token) = &cli.api_token {
        figment = figment.merge(Serialized::default("auth.api_token", token));
    }
    if cli.debug {
        figment = figment.merge(Serialized::default("logging.level", "debug"));
    }
    figment
}
