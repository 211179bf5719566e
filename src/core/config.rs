//! Simulation configuration with documented constants
//!
//! Every tuning constant of both model variants lives here, including the
//! ones older model revisions buried as literals (ledger capacities, the
//! move fallback rule). Configs are plain serde data so hosts can load them
//! from TOML; `validate()` is called by every constructor.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{EnclaveError, Result};
use crate::spatial::grid::EdgePolicy;

/// Grid dimensions and edge behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    /// Wrap edges (torus) instead of clipping neighborhoods at the boundary
    pub torus: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            torus: true,
        }
    }
}

impl GridConfig {
    pub fn new(width: u32, height: u32, torus: bool) -> Self {
        Self { width, height, torus }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn edge(&self) -> EdgePolicy {
        if self.torus {
            EdgePolicy::Torus
        } else {
            EdgePolicy::Bounded
        }
    }

    /// Number of agents placed for a given density
    pub fn population_for(&self, density: f64) -> usize {
        (density * self.cell_count() as f64).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EnclaveError::InvalidConfig(format!(
                "grid must have positive dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

// === SEGREGATION ===

/// How each agent's tolerance range is drawn at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToleranceDraw {
    /// Every agent gets exactly these bounds
    Fixed { lower: f64, upper: f64 },
    /// Lower bound drawn uniformly from `[min, max)`
    Uniform { min: f64, max: f64, upper: f64 },
    /// Lower bound drawn from a normal distribution
    Gaussian { mean: f64, std_dev: f64, upper: f64 },
}

impl Default for ToleranceDraw {
    fn default() -> Self {
        ToleranceDraw::Gaussian {
            mean: Self::DEFAULT_MEAN,
            std_dev: Self::DEFAULT_STD_DEV,
            upper: Self::DEFAULT_UPPER,
        }
    }
}

impl ToleranceDraw {
    /// Clamp applied to randomly drawn lower bounds
    pub const LOWER_FLOOR: f64 = 0.01;
    pub const LOWER_CEIL: f64 = 0.99;

    pub const DEFAULT_MEAN: f64 = 0.5;
    pub const DEFAULT_STD_DEV: f64 = 0.1;
    pub const DEFAULT_UPPER: f64 = 0.9;

    pub fn validate(&self) -> Result<()> {
        match *self {
            ToleranceDraw::Fixed { lower, upper } => {
                check_unit("tolerance lower", lower)?;
                check_unit("tolerance upper", upper)?;
                if lower > upper {
                    return Err(EnclaveError::InvalidConfig(format!(
                        "tolerance lower ({lower}) exceeds upper ({upper})"
                    )));
                }
            }
            ToleranceDraw::Uniform { min, max, upper } => {
                check_unit("tolerance min", min)?;
                check_unit("tolerance max", max)?;
                check_unit("tolerance upper", upper)?;
                if min > max {
                    return Err(EnclaveError::InvalidConfig(format!(
                        "tolerance min ({min}) exceeds max ({max})"
                    )));
                }
            }
            ToleranceDraw::Gaussian {
                mean,
                std_dev,
                upper,
            } => {
                check_finite("tolerance mean", mean)?;
                check_unit("tolerance upper", upper)?;
                if !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(EnclaveError::InvalidConfig(format!(
                        "tolerance std_dev must be finite and non-negative, got {std_dev}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Configuration for the residential segregation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegregationConfig {
    pub grid: GridConfig,
    /// Fraction of cells occupied at start
    pub density: f64,
    /// Probability that a new agent belongs to the majority group
    pub majority_share: f64,
    /// Moore radius agents look at when judging their neighborhood
    pub radius: u32,
    pub tolerance: ToleranceDraw,
    pub seed: u64,
}

impl Default for SegregationConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            density: 0.7,
            majority_share: 0.7,
            radius: 1,
            tolerance: ToleranceDraw::default(),
            seed: 42,
        }
    }
}

impl SegregationConfig {
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        check_unit("density", self.density)?;
        check_unit("majority_share", self.majority_share)?;
        check_radius("radius", self.radius)?;
        self.tolerance.validate()
    }
}

// === CONFLICT ===

/// What an agent does after declining (or not being offered) the
/// least-violent candidate cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackRule {
    /// Roll again; with probability `1 - aversion` move to a random empty
    /// neighbor, otherwise stay
    #[default]
    SecondRoll,
    /// Always pick uniformly among the current cell and empty neighbors
    AlwaysRandom,
}

/// Capacities of the bounded interaction memories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Outcomes kept per cell
    pub cell_capacity: usize,
    /// Outcomes kept per agent; `None` disables personal memory and
    /// threshold adaptation reads cell history within vision instead
    pub personal_capacity: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            cell_capacity: 10,
            personal_capacity: Some(5),
        }
    }
}

impl MemoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cell_capacity == 0 {
            return Err(EnclaveError::InvalidConfig(
                "cell_capacity must be positive".into(),
            ));
        }
        if self.personal_capacity == Some(0) {
            return Err(EnclaveError::InvalidConfig(
                "personal_capacity must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

/// Ranges for the uniformly drawn starting state of conflict agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialDisposition {
    /// Grievance drawn from `[0, grievance_max)`
    pub grievance_max: f64,
    /// Violence threshold drawn from `[threshold_min, threshold_max)`
    pub threshold_min: f64,
    pub threshold_max: f64,
}

impl Default for InitialDisposition {
    fn default() -> Self {
        Self {
            grievance_max: 0.2,
            threshold_min: 0.2,
            threshold_max: 1.0,
        }
    }
}

impl InitialDisposition {
    pub fn validate(&self) -> Result<()> {
        check_unit("grievance_max", self.grievance_max)?;
        check_unit("threshold_min", self.threshold_min)?;
        check_unit("threshold_max", self.threshold_max)?;
        if self.threshold_min > self.threshold_max {
            return Err(EnclaveError::InvalidConfig(format!(
                "threshold_min ({}) exceeds threshold_max ({})",
                self.threshold_min, self.threshold_max
            )));
        }
        Ok(())
    }
}

/// Configuration for the inter-group conflict model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    pub grid: GridConfig,
    pub density: f64,
    pub majority_share: f64,
    /// Moore radius searched for encounter partners and cell history
    pub vision: u32,
    /// Grievance gained by both parties after a violent encounter; also the
    /// erosion rate of the majority's violence threshold
    pub alpha: f64,
    /// Grievance shed after a neutral encounter; also the threshold's
    /// recovery rate
    pub beta: f64,
    /// Per-step multiplicative grievance decay
    pub decay: f64,
    /// Probability of taking the least-violent candidate cell
    pub aversion: f64,
    pub memory: MemoryConfig,
    pub fallback: FallbackRule,
    pub initial: InitialDisposition,
    pub seed: u64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::new(60, 60, false),
            density: 0.6,
            majority_share: 0.7,
            vision: 2,
            alpha: 0.2,
            beta: 0.05,
            decay: 0.8,
            aversion: 0.1,
            memory: MemoryConfig::default(),
            fallback: FallbackRule::default(),
            initial: InitialDisposition::default(),
            seed: 42,
        }
    }
}

impl ConflictConfig {
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        check_unit("density", self.density)?;
        check_unit("majority_share", self.majority_share)?;
        check_radius("vision", self.vision)?;
        check_unit("alpha", self.alpha)?;
        check_unit("beta", self.beta)?;
        check_unit("decay", self.decay)?;
        check_unit("aversion", self.aversion)?;
        self.memory.validate()?;
        self.initial.validate()
    }
}

/// Load any config struct from a TOML file
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(EnclaveError::InvalidConfig(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    check_finite(name, value)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(EnclaveError::InvalidConfig(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_radius(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(EnclaveError::InvalidConfig(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SegregationConfig::default().validate().is_ok());
        assert!(ConflictConfig::default().validate().is_ok());
    }

    #[test]
    fn test_density_out_of_range_rejected() {
        let config = SegregationConfig {
            density: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EnclaveError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let config = ConflictConfig {
            alpha: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_tolerance_rejected() {
        let config = SegregationConfig {
            tolerance: ToleranceDraw::Fixed {
                lower: 0.8,
                upper: 0.2,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_std_dev_rejected() {
        let draw = ToleranceDraw::Gaussian {
            mean: 0.5,
            std_dev: -0.1,
            upper: 0.9,
        };
        assert!(draw.validate().is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let grid = GridConfig::new(0, 10, true);
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let memory = MemoryConfig {
            cell_capacity: 0,
            personal_capacity: Some(5),
        };
        assert!(memory.validate().is_err());

        let memory = MemoryConfig {
            cell_capacity: 10,
            personal_capacity: Some(0),
        };
        assert!(memory.validate().is_err());
    }

    #[test]
    fn test_population_for_floors() {
        let grid = GridConfig::new(10, 10, false);
        assert_eq!(grid.population_for(0.7), 70);
        assert_eq!(grid.population_for(1.0), 100);
        assert_eq!(grid.population_for(0.005), 0);
    }

    #[test]
    fn test_toml_round_trip_partial() {
        let toml_str = r#"
            density = 0.5
            vision = 1
            fallback = "always_random"

            [grid]
            width = 20
            height = 30

            [memory]
            cell_capacity = 5
        "#;
        let config: ConflictConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.grid.width, 20);
        assert_eq!(config.grid.height, 30);
        assert!(config.grid.torus);
        assert_eq!(config.density, 0.5);
        assert_eq!(config.vision, 1);
        assert_eq!(config.fallback, FallbackRule::AlwaysRandom);
        assert_eq!(config.memory.cell_capacity, 5);
        assert_eq!(config.memory.personal_capacity, Some(5));
        assert_eq!(config.alpha, 0.2);
    }

    #[test]
    fn test_toml_tolerance_variants() {
        let toml_str = r#"
            [tolerance]
            kind = "fixed"
            lower = 0.0
            upper = 1.0
        "#;
        let config: SegregationConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.tolerance,
            ToleranceDraw::Fixed {
                lower: 0.0,
                upper: 1.0
            }
        );
    }
}
