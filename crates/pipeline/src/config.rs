//! Pipeline configuration
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! max_cells = 4_000_000
//! workers = 4
//! stretch_percentiles = [5.0, 95.0]
//! ```

use std::path::Path;
use std::time::Duration;

use nitrogis_algorithms::interpolation::GridLimits;
use nitrogis_algorithms::vector::{Containment, CrossingNumber, GeoIntersects};
use nitrogis_colormap::ColorScheme;
use nitrogis_core::{Error, Result};
use nitrogis_parallel::CancelToken;
use serde::{Deserialize, Serialize};

/// Point-in-polygon rule used for zonal means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainmentRule {
    #[default]
    CrossingNumber,
    GeoIntersects,
}

impl ContainmentRule {
    pub fn as_containment(&self) -> &'static dyn Containment {
        match self {
            ContainmentRule::CrossingNumber => &CrossingNumber,
            ContainmentRule::GeoIntersects => &GeoIntersects,
        }
    }
}

/// Limits, scheduling and rendering options shared by single runs and sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Largest permitted grid cell count
    pub max_cells: u64,
    /// Largest permitted IDW neighbor count
    pub max_neighbors: usize,
    /// Padding around the input extent, in metres
    pub margin: f64,
    /// Sweep worker threads; 0 or 1 runs powers sequentially
    pub workers: usize,
    /// Grid rows evaluated between cancellation checks
    pub batch_rows: usize,
    /// Alpha of valid overlay pixels
    pub png_alpha: u8,
    /// Low and high percentiles of the overlay stretch
    pub stretch_percentiles: (f64, f64),
    pub colormap: ColorScheme,
    pub containment: ContainmentRule,
    /// Wall-clock budget for one invocation
    pub timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_cells: 25_000_000,
            max_neighbors: 256,
            margin: 0.0,
            workers: 1,
            batch_rows: 64,
            png_alpha: 180,
            stretch_percentiles: (2.0, 98.0),
            colormap: ColorScheme::Nitrate,
            containment: ContainmentRule::CrossingNumber,
            timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cells == 0 {
            return Err(Error::invalid_parameter("max_cells", self.max_cells, "must be at least 1"));
        }
        if self.max_neighbors == 0 {
            return Err(Error::invalid_parameter(
                "max_neighbors",
                self.max_neighbors,
                "must be at least 1",
            ));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(Error::invalid_parameter("margin", self.margin, "must be finite and non-negative"));
        }
        if self.batch_rows == 0 {
            return Err(Error::invalid_parameter("batch_rows", self.batch_rows, "must be at least 1"));
        }
        let (lo, hi) = self.stretch_percentiles;
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo >= hi {
            return Err(Error::invalid_parameter(
                "stretch_percentiles",
                format!("({}, {})", lo, hi),
                "need 0 <= low < high <= 100",
            ));
        }
        Ok(())
    }

    pub fn limits(&self) -> GridLimits {
        GridLimits {
            max_cells: self.max_cells,
            max_neighbors: self.max_neighbors,
        }
    }

    /// A fresh token carrying `timeout_secs` as its deadline
    pub fn cancel_token(&self) -> CancelToken {
        match self.timeout_secs {
            Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
            None => CancelToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits(), GridLimits::default());
        assert!(!config.cancel_token().is_cancelled());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            workers = 4
            stretch_percentiles = [5.0, 95.0]
            containment = "geo-intersects"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.stretch_percentiles, (5.0, 95.0));
        assert_eq!(config.containment, ContainmentRule::GeoIntersects);
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.max_cells, 25_000_000);
        assert_eq!(config.png_alpha, 180);
    }

    #[test]
    fn toml_round_trip() {
        let config = PipelineConfig {
            margin: 500.0,
            colormap: ColorScheme::Water,
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            PipelineConfig::from_toml_str("batch_rows = 0"),
            Err(Error::InvalidParameter { name: "batch_rows", .. })
        ));
        assert!(PipelineConfig::from_toml_str("stretch_percentiles = [98.0, 2.0]").is_err());
        assert!(PipelineConfig::from_toml_str("margin = -1.0").is_err());
        assert!(matches!(
            PipelineConfig::from_toml_str("workers = \"many\""),
            Err(Error::Config(_))
        ));
    }
}
