//! Unitless performance scores used as a price proxy where market data is missing or stale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{common::finite_or_zero, schemas::computing::SpecKey};

fn get(specs: &BTreeMap<SpecKey, f64>, key: SpecKey) -> f64 {
    specs.get(&key).copied().map(finite_or_zero).unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuWeights {
    pub per_core: f64,
    pub per_base_ghz: f64,
    pub per_boost_ghz: f64,
}

impl Default for CpuWeights {
    fn default() -> Self {
        Self {
            per_core: 12.0,
            per_base_ghz: 5.0,
            per_boost_ghz: 4.0,
        }
    }
}

impl CpuWeights {
    pub fn score(&self, specs: &BTreeMap<SpecKey, f64>) -> f64 {
        get(specs, SpecKey::CoreCount) * finite_or_zero(self.per_core)
            + get(specs, SpecKey::CoreClockGhz) * finite_or_zero(self.per_base_ghz)
            + get(specs, SpecKey::BoostClockGhz) * finite_or_zero(self.per_boost_ghz)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuWeights {
    pub per_memory_gb: f64,
    pub per_core_mhz: f64,
    pub per_boost_mhz: f64,
}

impl Default for GpuWeights {
    fn default() -> Self {
        Self {
            per_memory_gb: 0.15,
            per_core_mhz: 0.08,
            per_boost_mhz: 0.09,
        }
    }
}

impl GpuWeights {
    pub fn score(&self, specs: &BTreeMap<SpecKey, f64>) -> f64 {
        get(specs, SpecKey::MemoryGb) * finite_or_zero(self.per_memory_gb)
            + get(specs, SpecKey::CoreClockMhz) * finite_or_zero(self.per_core_mhz)
            + get(specs, SpecKey::BoostClockMhz) * finite_or_zero(self.per_boost_mhz)
    }
}

#[cfg(test)]
mod tests {
    use super::{CpuWeights, GpuWeights};
    use crate::{common::tests::roughly_equal, schemas::computing::SpecKey};
    use maplit::btreemap;
    use std::collections::BTreeMap;

    #[test]
    fn test_cpu_score() {
        let specs = btreemap! {
            SpecKey::CoreCount => 6.0,
            SpecKey::CoreClockGhz => 3.5,
            SpecKey::BoostClockGhz => 4.2,
        };
        assert!(roughly_equal(CpuWeights::default().score(&specs), 72.0 + 17.5 + 16.8));
    }

    #[test]
    fn test_gpu_score() {
        let specs = btreemap! {
            SpecKey::MemoryGb => 8.0,
            SpecKey::CoreClockMhz => 1500.0,
            SpecKey::BoostClockMhz => 1700.0,
        };
        assert!(roughly_equal(GpuWeights::default().score(&specs), 1.2 + 120.0 + 153.0));
    }

    #[test]
    fn test_absent_inputs_contribute_nothing() {
        assert_eq!(CpuWeights::default().score(&BTreeMap::new()), 0.0);
        assert_eq!(GpuWeights::default().score(&BTreeMap::new()), 0.0);

        let odd = btreemap! {
            SpecKey::MemoryGb => f64::NAN,
            SpecKey::CoreClockMhz => -100.0,
            SpecKey::BoostClockMhz => 1000.0,
        };
        assert!(roughly_equal(GpuWeights::default().score(&odd), 90.0));
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let cpu = CpuWeights::default();
        let gpu = GpuWeights::default();
        let base = btreemap! {
            SpecKey::CoreCount => 4.0,
            SpecKey::CoreClockGhz => 3.0,
            SpecKey::BoostClockGhz => 4.0,
            SpecKey::MemoryGb => 8.0,
            SpecKey::CoreClockMhz => 1400.0,
            SpecKey::BoostClockMhz => 1600.0,
        };

        for key in base.keys() {
            let mut bumped = base.clone();
            *bumped.get_mut(key).unwrap() += 1.0;
            assert!(cpu.score(&bumped) >= cpu.score(&base), "{:?}", key);
            assert!(gpu.score(&bumped) >= gpu.score(&base), "{:?}", key);
        }
    }
}
