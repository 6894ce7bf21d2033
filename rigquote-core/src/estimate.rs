use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    common::finite_or_zero,
    config::ValuationConfig,
    schemas::computing::{PartClass, PartRecord},
};

/// How a performance-derived estimate and a known market price combine into one price.
///
/// A partial table only overrides the keys it names; the rest keep the defaults of the part
/// class it belongs to (see [`PriceModel::cpu`] and [`PriceModel::gpu`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceModel {
    /// Scales `score * depreciation` into currency units.
    pub class_multiplier: f64,
    pub performance_weight: f64,
    pub market_weight: f64,
    /// Apply the depreciation factor to the market price too. Listed prices are usually
    /// launch prices.
    pub depreciate_market_price: bool,
    /// Never let the performance estimate exceed this multiple of the market price.
    /// Written as `0` when there is no cap.
    #[serde(serialize_with = "serialize_cap")]
    pub market_cap_ratio: Option<f64>,
}

fn serialize_cap<S: Serializer>(cap: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(cap.unwrap_or(0.0))
}

/// `0` turns the cap off. Other values are kept as given for validation to judge.
fn cap_from(ratio: f64) -> Option<f64> {
    (ratio != 0.0).then(|| ratio)
}

/// A pricing table as written, every key optional.
#[derive(Deserialize)]
struct PriceModelTable {
    class_multiplier: Option<f64>,
    performance_weight: Option<f64>,
    market_weight: Option<f64>,
    depreciate_market_price: Option<bool>,
    market_cap_ratio: Option<f64>,
}

impl Default for PriceModel {
    fn default() -> Self {
        Self::cpu()
    }
}

impl PriceModel {
    pub fn cpu() -> Self {
        Self {
            class_multiplier: 2.0,
            performance_weight: 2.0,
            market_weight: 1.0,
            depreciate_market_price: true,
            market_cap_ratio: Some(1.4),
        }
    }

    pub fn gpu() -> Self {
        Self {
            class_multiplier: 1.5,
            ..Self::cpu()
        }
    }

    /// Deserialize a possibly partial table, taking missing keys from `base`.
    pub fn deserialize_over<'de, D: Deserializer<'de>>(
        base: Self,
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let table = PriceModelTable::deserialize(deserializer)?;
        Ok(Self {
            class_multiplier: table.class_multiplier.unwrap_or(base.class_multiplier),
            performance_weight: table.performance_weight.unwrap_or(base.performance_weight),
            market_weight: table.market_weight.unwrap_or(base.market_weight),
            depreciate_market_price: table
                .depreciate_market_price
                .unwrap_or(base.depreciate_market_price),
            market_cap_ratio: match table.market_cap_ratio {
                Some(ratio) => cap_from(ratio),
                None => base.market_cap_ratio,
            },
        })
    }
}

impl<'de> Deserialize<'de> for PriceModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::deserialize_over(Self::cpu(), deserializer)
    }
}

/// For `gpu.pricing`: a partial table falls back to the GPU defaults, not the CPU ones.
pub(crate) fn deserialize_gpu_pricing<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<PriceModel, D::Error> {
    PriceModel::deserialize_over(PriceModel::gpu(), deserializer)
}

impl PriceModel {
    pub fn estimate(&self, score: f64, depreciation: f64, market_price: Option<f64>) -> f64 {
        let depreciation = finite_or_zero(depreciation);
        let performance =
            finite_or_zero(score) * depreciation * finite_or_zero(self.class_multiplier);

        let market = match market_price.map(finite_or_zero).filter(|p| *p > 0.0) {
            Some(market) => market,
            None => return finite_or_zero(performance),
        };

        let performance = match self.market_cap_ratio.map(finite_or_zero).filter(|r| *r > 0.0) {
            Some(ratio) => performance.min(ratio * market),
            None => performance,
        };
        let market = if self.depreciate_market_price {
            market * depreciation
        } else {
            market
        };

        let (pw, mw) = (
            finite_or_zero(self.performance_weight),
            finite_or_zero(self.market_weight),
        );
        let blended = if pw + mw > 0.0 {
            (pw * performance + mw * market) / (pw + mw)
        } else {
            (performance + market) / 2.0
        };

        finite_or_zero(blended)
    }
}

/// Estimate what one CPU or GPU is worth as of `today`.
pub fn estimate_part(record: &PartRecord, config: &ValuationConfig, today: NaiveDate) -> f64 {
    let (score, depreciation, pricing) = match record.class() {
        PartClass::Cpu => (
            config.cpu.weights.score(record.specs()),
            config.cpu.depreciation.factor(record.launch_date(), today),
            &config.cpu.pricing,
        ),
        PartClass::Gpu => (
            config.gpu.weights.score(record.specs()),
            config.gpu.depreciation.factor(record.launch_date(), today),
            &config.gpu.pricing,
        ),
    };

    pricing.estimate(score, depreciation, record.market_price())
}
