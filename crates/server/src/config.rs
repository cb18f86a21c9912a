use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use eyre::WrapErr;
use geohunt_core::settings::Settings;
use tracing::{info, warn};

pub struct Config {
    pub bind: String,
    pub port: u16,
    /// JSON question bank; the built-in bank is used when unset.
    pub questions_path: Option<PathBuf>,
    /// Base seed for reproducible hunts.
    pub seed: Option<u64>,
    pub photo_verifier_url: Option<String>,
    pub settings: Settings,
}

impl Config {
    pub fn load() -> eyre::Result<Self> {
        let defaults = Settings::default();
        let settings = Settings {
            time_limit: try_load("GEOHUNT_TIME_LIMIT", defaults.time_limit)?,
            checkpoint_count: try_load("GEOHUNT_CHECKPOINTS", defaults.checkpoint_count)?,
            roving_count: try_load("GEOHUNT_ROVING", defaults.roving_count)?,
            radius: try_load("GEOHUNT_RADIUS", defaults.radius)?,
        };
        settings.validate().wrap_err("invalid default hunt settings")?;

        Ok(Self {
            bind: try_load("GEOHUNT_BIND", "0.0.0.0".to_string())?,
            port: try_load("GEOHUNT_PORT", 8080)?,
            questions_path: var("GEOHUNT_QUESTIONS").map(PathBuf::from),
            seed: var("GEOHUNT_SEED")
                .map(|raw| raw.parse().wrap_err("GEOHUNT_SEED must be an unsigned integer"))
                .transpose()?,
            photo_verifier_url: var("GEOHUNT_PHOTO_VERIFIER_URL"),
            settings,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> eyre::Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            eyre::eyre!("environment variable {key} is misconfigured: {e}")
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_key_falls_back_to_default() {
        assert_eq!(try_load("GEOHUNT_TEST_NEVER_SET", 42u32).unwrap(), 42);
        assert!(var("GEOHUNT_TEST_NEVER_SET").is_none());
    }
}
