use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_companion_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    /// Bearer token issued by the identity provider; pasted in by hand.
    pub token: Option<String>,
    /// Care recipient whose medication schedule we fetch.
    pub patient_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySection {
    /// IANA timezone the caregiver reads the schedule in.
    pub timezone: String,
    /// "Upcoming" window in minutes; beyond it items land under "later".
    pub proximity_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSection {
                base_url: "http://localhost:3000".to_string(),
                token: None,
                patient_id: "me".to_string(),
            },
            display: DisplaySection {
                timezone: "America/Chicago".to_string(),
                proximity_minutes: 30,
            },
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.display
            .timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone in config: {}", self.display.timezone))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_companion_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.api.base_url, cfg.api.base_url);
        assert_eq!(back.display.proximity_minutes, 30);
        assert!(back.timezone().is_ok());
    }
}
