//! The offer for a whole machine: CPU and GPU valued from their records, everything else
//! priced linearly, then adjusted for condition and for which side of the deal we are on.

use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::{
    cache::PartCache,
    common::{finite_or_zero, parse_or_zero},
    config::{ComponentConfig, ValuationConfig},
    error::OfferError,
    estimate::estimate_part,
    schemas::{
        computing::{PartClass, PartRecord},
        money::{Currency, Money},
    },
};

/// Lowercase and keep only letters and digits: `"Like New"`, `"like-new"` -> `"likenew"`.
fn token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_or_default<T: FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

/// Physical condition. Anything unrecognized counts as [`Condition::Used`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    New,
    LikeNew,
    #[default]
    Used,
    Worn,
}

impl Condition {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::New => 1.1,
            Self::LikeNew => 0.85,
            Self::Used => 0.7,
            Self::Worn => 0.5,
        }
    }
}

impl FromStr for Condition {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match token(s).as_str() {
            "new" => Self::New,
            "likenew" => Self::LikeNew,
            "used" => Self::Used,
            "worn" => Self::Worn,
            _ => bail!("unknown condition: {}", s),
        })
    }
}

/// Which way the machine changes hands. We pay less when the customer sells to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Sell,
    Buy,
}

impl Direction {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sell => 0.9,
            Self::Buy => 1.1,
        }
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match token(s).as_str() {
            "sell" | "selling" | "tradein" => Self::Sell,
            "buy" | "buying" | "purchase" => Self::Buy,
            _ => bail!("unknown transaction direction: {}", s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RamGeneration {
    Ddr2,
    Ddr3,
    #[default]
    Ddr4,
    Ddr5,
}

impl RamGeneration {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Ddr2 => 0.5,
            Self::Ddr3 => 0.75,
            Self::Ddr4 => 1.0,
            Self::Ddr5 => 1.3,
        }
    }
}

impl FromStr for RamGeneration {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match token(s).as_str() {
            "ddr2" => Self::Ddr2,
            "ddr3" => Self::Ddr3,
            "ddr4" => Self::Ddr4,
            "ddr5" => Self::Ddr5,
            _ => bail!("unknown memory generation: {}", s),
        })
    }
}

/// Solid-state or spinning. Anything that is not recognizably solid-state is priced as a disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Ssd,
    #[default]
    Hdd,
}

impl StorageKind {
    fn per_gb(self, components: &ComponentConfig) -> f64 {
        match self {
            Self::Ssd => components.ssd_per_gb,
            Self::Hdd => components.hdd_per_gb,
        }
    }
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = token(s);
        if t.contains("ssd") || t.contains("nvme") || t == "m2" {
            Ok(Self::Ssd)
        } else if t.contains("hdd") || t.contains("disk") {
            Ok(Self::Hdd)
        } else {
            bail!("unknown storage type: {}", s)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageDevice {
    pub gb: f64,
    pub kind: StorageKind,
}

impl StorageDevice {
    pub fn price(&self, components: &ComponentConfig) -> f64 {
        finite_or_zero(self.gb) * finite_or_zero(self.kind.per_gb(components))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WattageBracket {
    Under450,
    From450,
    From650,
    From850,
    From1000,
}

impl WattageBracket {
    /// `None` when no wattage was given.
    pub fn from_watts(watts: f64) -> Option<Self> {
        let watts = finite_or_zero(watts);
        if watts <= 0.0 {
            None
        } else if watts < 450.0 {
            Some(Self::Under450)
        } else if watts < 650.0 {
            Some(Self::From450)
        } else if watts < 850.0 {
            Some(Self::From650)
        } else if watts < 1000.0 {
            Some(Self::From850)
        } else {
            Some(Self::From1000)
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Under450 => 0.6,
            Self::From450 => 0.8,
            Self::From650 => 1.0,
            Self::From850 => 1.2,
            Self::From1000 => 1.4,
        }
    }
}

/// 80 PLUS tier. An unlisted or absent rating counts as [`Certification::Standard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Certification {
    #[default]
    Standard,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Titanium,
}

impl Certification {
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Standard => 0.8,
            Self::Bronze => 0.9,
            Self::Silver => 0.95,
            Self::Gold => 1.0,
            Self::Platinum => 1.15,
            Self::Titanium => 1.3,
        }
    }
}

impl FromStr for Certification {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = token(s);
        Ok(match t.trim_start_matches("80plus").trim_start_matches("80") {
            "" | "none" | "white" | "standard" => Self::Standard,
            "bronze" => Self::Bronze,
            "silver" => Self::Silver,
            "gold" => Self::Gold,
            "platinum" => Self::Platinum,
            "titanium" => Self::Titanium,
            _ => bail!("unknown certification: {}", s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Psu {
    pub watts: f64,
    pub certification: Certification,
}

impl Psu {
    /// Zero when the wattage is unknown.
    pub fn price(&self, components: &ComponentConfig) -> f64 {
        match WattageBracket::from_watts(self.watts) {
            Some(bracket) => {
                finite_or_zero(components.psu_base)
                    * bracket.multiplier()
                    * self.certification.multiplier()
            }
            None => 0.0,
        }
    }
}

/// Everything the user selected for one calculation.
#[derive(Debug, Clone, Default)]
pub struct OfferInput<'a> {
    pub cpu: Option<&'a PartRecord>,
    pub gpu: Option<&'a PartRecord>,
    pub ram_gb: f64,
    pub ram_generation: RamGeneration,
    pub primary_storage: StorageDevice,
    pub secondary_storage: Option<StorageDevice>,
    pub psu: Option<Psu>,
    pub condition: Condition,
    pub direction: Direction,
}

/// The form as submitted: every field is free text and may be missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OfferForm {
    pub cpu: Option<String>,
    pub gpu: Option<String>,
    pub ram: Option<String>,
    pub ram_type: Option<String>,
    pub storage: Option<String>,
    pub storage_type: Option<String>,
    pub secondary_storage: Option<String>,
    pub secondary_storage_type: Option<String>,
    pub psu_wattage: Option<String>,
    pub psu_certification: Option<String>,
    pub condition: Option<String>,
    pub transaction: Option<String>,
}

fn number(value: &Option<String>) -> f64 {
    value.as_deref().map(parse_or_zero).unwrap_or(0.0)
}

fn selection<'a>(
    cache: &'a PartCache,
    class: PartClass,
    value: &Option<String>,
) -> Result<Option<&'a PartRecord>, OfferError> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(name) => cache
            .find(class, name)
            .map(Some)
            .ok_or_else(|| OfferError::UnknownPart {
                class,
                name: name.to_string(),
            }),
        None => Ok(None),
    }
}

impl<'a> OfferInput<'a> {
    /// Validate a submitted form once. Unparseable numbers become `0`, unrecognized choices
    /// take their default; only a part name the cache does not know is an error.
    pub fn from_form(form: &OfferForm, cache: &'a PartCache) -> Result<Self, OfferError> {
        let secondary_gb = number(&form.secondary_storage);
        let psu_watts = number(&form.psu_wattage);

        Ok(Self {
            cpu: selection(cache, PartClass::Cpu, &form.cpu)?,
            gpu: selection(cache, PartClass::Gpu, &form.gpu)?,
            ram_gb: number(&form.ram),
            ram_generation: parse_or_default(form.ram_type.as_deref()),
            primary_storage: StorageDevice {
                gb: number(&form.storage),
                kind: parse_or_default(form.storage_type.as_deref()),
            },
            secondary_storage: (secondary_gb > 0.0).then(|| StorageDevice {
                gb: secondary_gb,
                kind: parse_or_default(form.secondary_storage_type.as_deref()),
            }),
            psu: (psu_watts > 0.0).then(|| Psu {
                watts: psu_watts,
                certification: parse_or_default(form.psu_certification.as_deref()),
            }),
            condition: parse_or_default(form.condition.as_deref()),
            direction: parse_or_default(form.transaction.as_deref()),
        })
    }
}

/// Line items of an offer. Only `total` is rounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferBreakdown {
    pub cpu: f64,
    pub gpu: f64,
    pub ram: f64,
    pub storage: f64,
    pub psu: f64,
    pub base: f64,
    pub condition: Condition,
    pub condition_multiplier: f64,
    pub direction: Direction,
    pub direction_multiplier: f64,
    pub total: f64,
    pub currency: Currency,
}

impl OfferBreakdown {
    pub fn total(&self) -> Money {
        Money {
            unit: self.currency,
            amount: self.total,
        }
    }
}

/// Price every line item and combine them into an offer as of `today`.
///
/// # Errors
/// [`OfferError::MissingSelection`] if no CPU or no GPU was selected.
pub fn compose_offer(
    input: &OfferInput,
    config: &ValuationConfig,
    today: NaiveDate,
) -> Result<OfferBreakdown, OfferError> {
    let cpu = input
        .cpu
        .filter(|r| r.class() == PartClass::Cpu)
        .ok_or(OfferError::MissingSelection(PartClass::Cpu))?;
    let gpu = input
        .gpu
        .filter(|r| r.class() == PartClass::Gpu)
        .ok_or(OfferError::MissingSelection(PartClass::Gpu))?;

    let components = &config.components;
    let cpu_price = estimate_part(cpu, config, today);
    let gpu_price = estimate_part(gpu, config, today);
    let ram = finite_or_zero(input.ram_gb)
        * finite_or_zero(components.ram_per_gb)
        * input.ram_generation.multiplier();
    let storage = input.primary_storage.price(components)
        + input
            .secondary_storage
            .map(|device| device.price(components))
            .unwrap_or(0.0);
    let psu = input.psu.map(|psu| psu.price(components)).unwrap_or(0.0);

    let base = cpu_price + gpu_price + ram + storage + psu;
    let condition_multiplier = input.condition.multiplier();
    let direction_multiplier = input.direction.multiplier();
    let total = config
        .offer
        .rounding
        .apply(finite_or_zero(base * condition_multiplier * direction_multiplier));

    debug!(
        cpu = cpu.name(),
        gpu = gpu.name(),
        cpu_price,
        gpu_price,
        base,
        total,
        "composed offer"
    );

    Ok(OfferBreakdown {
        cpu: cpu_price,
        gpu: gpu_price,
        ram,
        storage,
        psu,
        base,
        condition: input.condition,
        condition_multiplier,
        direction: input.direction,
        direction_multiplier,
        total,
        currency: config.offer.currency,
    })
}

/// The offer total alone. See [`compose_offer`].
pub fn compute_offer(
    input: &OfferInput,
    config: &ValuationConfig,
    today: NaiveDate,
) -> Result<f64, OfferError> {
    compose_offer(input, config, today).map(|breakdown| breakdown.total)
}
