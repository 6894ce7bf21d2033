//! Calibration for every stage of the valuation.
//!
//! None of these numbers are correctness invariants; they tune how specs turn into money.
//! Everything has a default, so an empty configuration is valid.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{
    depreciation::Depreciation,
    estimate::PriceModel,
    schemas::money::Currency,
    score::{CpuWeights, GpuWeights},
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub reconcile: ReconcileConfig,
    pub cpu: CpuConfig,
    pub gpu: GpuConfig,
    pub components: ComponentConfig,
    pub offer: OfferConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Share of the highest listed prices discarded before averaging a GPU group's price.
    pub outlier_trim_fraction: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            outlier_trim_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CpuConfig {
    pub depreciation: Depreciation,
    pub weights: CpuWeights,
    pub pricing: PriceModel,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GpuConfig {
    pub depreciation: Depreciation,
    pub weights: GpuWeights,
    #[serde(deserialize_with = "crate::estimate::deserialize_gpu_pricing")]
    pub pricing: PriceModel,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            depreciation: Depreciation::per_year(0.2),
            weights: GpuWeights::default(),
            pricing: PriceModel::gpu(),
        }
    }
}

/// Linear rates for the parts priced without a dataset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ComponentConfig {
    pub ram_per_gb: f64,
    pub ssd_per_gb: f64,
    pub hdd_per_gb: f64,
    /// Price of a PSU before the wattage and certification multipliers.
    pub psu_base: f64,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            ram_per_gb: 4.0,
            ssd_per_gb: 0.10,
            hdd_per_gb: 0.04,
            psu_base: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    Cents,
    Whole,
}

impl Rounding {
    pub fn apply(&self, amount: f64) -> f64 {
        match self {
            Self::Cents => (amount * 100.0).round() / 100.0,
            Self::Whole => amount.round(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OfferConfig {
    pub rounding: Rounding,
    pub currency: Currency,
}

impl Default for OfferConfig {
    fn default() -> Self {
        Self {
            rounding: Rounding::Cents,
            currency: Currency::EUR,
        }
    }
}

/// Where the four datasets live: an `http(s)://` URL or a file path.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub cpu_launch_dates: Option<String>,
    pub cpu_prices: Option<String>,
    pub gpu_listings: Option<String>,
    pub gpu_catalog: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            cpu_launch_dates: None,
            cpu_prices: Some(
                "https://raw.githubusercontent.com/docyx/pc-part-dataset/main/data/json/cpu.json"
                    .to_string(),
            ),
            gpu_listings: Some(
                "https://raw.githubusercontent.com/docyx/pc-part-dataset/main/data/json/video-card.json"
                    .to_string(),
            ),
            gpu_catalog: Some("gpu.json".to_string()),
        }
    }
}

/// Load the configuration from `path` (or `rigquote.toml` in the working directory, if it
/// exists), then apply `RIGQUOTE__SECTION__KEY` environment overrides.
///
/// # Errors
/// Errors if a file cannot be parsed or the result fails [`ValuationConfig::validate`].
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ValuationConfig> {
    let file = match path {
        Some(path) => config::File::from(path),
        None => config::File::with_name("rigquote").required(false),
    };

    let config = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("RIGQUOTE").separator("__"))
        .build()
        .context("could not read configuration")?;

    let cfg: ValuationConfig = config
        .try_deserialize()
        .context("invalid configuration")?;
    cfg.validate()?;

    Ok(cfg)
}

fn check_non_negative(name: &str, value: f64) -> anyhow::Result<()> {
    if !value.is_finite() || value < 0.0 {
        bail!("{} must be a non-negative number, got {}", name, value);
    }
    Ok(())
}

fn check_pricing(class: &str, pricing: &PriceModel) -> anyhow::Result<()> {
    let key = |name: &str| format!("{}.pricing.{}", class, name);
    check_non_negative(&key("class_multiplier"), pricing.class_multiplier)?;
    check_non_negative(&key("performance_weight"), pricing.performance_weight)?;
    check_non_negative(&key("market_weight"), pricing.market_weight)?;
    if pricing.performance_weight + pricing.market_weight == 0.0 {
        bail!("{}.pricing weights cannot both be zero", class);
    }
    if let Some(ratio) = pricing.market_cap_ratio {
        if !ratio.is_finite() || ratio <= 0.0 {
            bail!("{} must be positive or 0 for no cap, got {}", key("market_cap_ratio"), ratio);
        }
    }
    Ok(())
}

impl ValuationConfig {
    /// # Errors
    /// Errors on negative or non-finite weights and rates, and on a trim fraction outside `[0, 1)`.
    pub fn validate(&self) -> anyhow::Result<()> {
        let trim = self.reconcile.outlier_trim_fraction;
        if !(0.0..1.0).contains(&trim) {
            bail!("reconcile.outlier_trim_fraction must be in [0, 1), got {}", trim);
        }

        check_non_negative("cpu.depreciation.rate", self.cpu.depreciation.rate)?;
        check_non_negative("cpu.weights.per_core", self.cpu.weights.per_core)?;
        check_non_negative("cpu.weights.per_base_ghz", self.cpu.weights.per_base_ghz)?;
        check_non_negative("cpu.weights.per_boost_ghz", self.cpu.weights.per_boost_ghz)?;
        check_pricing("cpu", &self.cpu.pricing)?;

        check_non_negative("gpu.depreciation.rate", self.gpu.depreciation.rate)?;
        check_non_negative("gpu.weights.per_memory_gb", self.gpu.weights.per_memory_gb)?;
        check_non_negative("gpu.weights.per_core_mhz", self.gpu.weights.per_core_mhz)?;
        check_non_negative("gpu.weights.per_boost_mhz", self.gpu.weights.per_boost_mhz)?;
        check_pricing("gpu", &self.gpu.pricing)?;

        check_non_negative("components.ram_per_gb", self.components.ram_per_gb)?;
        check_non_negative("components.ssd_per_gb", self.components.ssd_per_gb)?;
        check_non_negative("components.hdd_per_gb", self.components.hdd_per_gb)?;
        check_non_negative("components.psu_base", self.components.psu_base)?;

        Ok(())
    }

    /// Render as TOML, in the same layout [`load_config`] reads.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("could not render configuration")
    }
}
