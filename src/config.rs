use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Settings file looked up in the working directory at startup.
pub const SETTINGS_FILE: &str = "launch-dash.toml";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Server settings. Every field has a default, so the file is optional and
/// may override any subset of keys.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub dataset_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub slider: SliderDomain,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("spacex_launch_dash.csv"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8050,
            slider: SliderDomain::default(),
        }
    }
}

/// Fixed domain of the payload range slider, in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliderDomain {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SliderDomain {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10000.0,
            step: 1000.0,
        }
    }
}

impl SliderDomain {
    /// Tick positions, one per step from `min` to `max` inclusive.
    pub fn marks(&self) -> Vec<f64> {
        let steps = ((self.max - self.min) / self.step).floor() as usize;
        (0..=steps).map(|i| self.min + i as f64 * self.step).collect()
    }
}

impl Settings {
    /// Read settings from [`SETTINGS_FILE`] if it exists, otherwise use defaults.
    pub fn load() -> Result<Self> {
        let path = Path::new(SETTINGS_FILE);
        if !path.exists() {
            log::debug!("no {SETTINGS_FILE} found, using default settings");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let s = &self.slider;
        if !(s.min >= 0.0 && s.min < s.max && s.step > 0.0) {
            bail!(
                "slider domain must satisfy 0 <= min < max and step > 0 (got min={}, max={}, step={})",
                s.min,
                s.max,
                s.step
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dashboard() {
        let s = Settings::default();
        assert_eq!(s.bind_addr().to_string(), "127.0.0.1:8050");
        assert_eq!(s.dataset_path, PathBuf::from("spacex_launch_dash.csv"));
        assert_eq!(
            s.slider.marks(),
            [0.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0, 9000.0, 10000.0]
        );
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let s = Settings::from_toml(
            r#"
            port = 9000
            dataset_path = "data/launches.parquet"

            [slider]
            max = 16000
            "#,
        )
        .unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(s.dataset_path, PathBuf::from("data/launches.parquet"));
        assert_eq!(s.slider.max, 16000.0);
        assert_eq!(s.slider.step, 1000.0);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_slider() {
        assert!(Settings::from_toml("prot = 80").is_err());
        assert!(Settings::from_toml("[slider]\nstep = 0").is_err());
        assert!(Settings::from_toml("[slider]\nmin = 5000\nmax = 1000").is_err());
    }

    #[test]
    fn reads_settings_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "host = \"0.0.0.0\"\n").unwrap();
        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.bind_addr().to_string(), "0.0.0.0:8050");
    }
}
