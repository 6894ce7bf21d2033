//! Merge the raw datasets of one part class into canonical [`PartRecord`]s.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::{
    config::ReconcileConfig,
    modules::{
        cpu::RawCpu,
        gpu::{RawGpuListing, RawGpuModel, RawGpuSeries},
    },
    normalize::{cpu_key, normalize},
    schemas::computing::{LaunchDate, PartClass, PartRecord, SpecKey},
};

fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean of the positive values after discarding the highest `trim_fraction` of them.
///
/// At least one value always survives, so `[100.0, 1000.0]` trimmed by 10% averages to `100.0`.
/// Returns `None` when there is no positive value at all.
pub fn trimmed_mean(values: &[f64], trim_fraction: f64) -> Option<f64> {
    let mut values = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect::<Vec<_>>();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let fraction = if trim_fraction.is_finite() {
        trim_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    /* the epsilon keeps 30 * 0.1 from rounding up to 4 */
    let drop = ((values.len() as f64 * fraction - 1e-9).ceil().max(0.0) as usize)
        .min(values.len() - 1);

    mean(values[..values.len() - drop].iter().copied())
}

/// Identifies one exact CPU SKU: same name, core count and base clock.
#[derive(PartialEq, Eq, Hash)]
struct SkuKey {
    name: String,
    core_count: Option<u32>,
    core_clock_mhz: Option<i64>,
}

impl SkuKey {
    fn of(name: &str, cpu: &RawCpu) -> Self {
        Self {
            name: name
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
            core_count: cpu.core_count,
            core_clock_mhz: cpu
                .core_clock
                .filter(|c| c.is_finite())
                .map(|c| (c * 1000.0).round() as i64),
        }
    }
}

struct Sku<'a> {
    name: &'a str,
    merged: RawCpu,
    prices: Vec<f64>,
}

struct GpuGroup<'a> {
    key: String,
    members: Vec<&'a RawGpuListing>,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Reconcile CPUs.
    ///
    /// `priced` is the primary source of specs and prices; `launch_dates` only supplies launch
    /// dates, matched by normalized name. Without a priced dataset the launch-date list is its
    /// own primary. One record comes out per distinct SKU.
    pub fn cpus(&self, launch_dates: &[RawCpu], priced: Option<&[RawCpu]>) -> Vec<PartRecord> {
        let mut dates: HashMap<String, LaunchDate> = HashMap::new();
        for cpu in launch_dates {
            if let (Some(name), Some(date)) = (cpu.name.as_deref(), cpu.launch_date) {
                let key = cpu_key(name);
                if !key.is_empty() {
                    /* last write wins */
                    dates.insert(key, date);
                }
            }
        }

        let primary = priced.unwrap_or(launch_dates);
        let mut index: HashMap<SkuKey, usize> = HashMap::new();
        let mut skus: Vec<Sku> = Vec::new();

        for cpu in primary {
            let name = match cpu.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                Some(name) => name,
                None => continue,
            };

            let price = cpu.price.filter(|p| p.is_finite() && *p > 0.0);
            let key = SkuKey::of(name, cpu);
            match index.get(&key).copied() {
                Some(i) => {
                    let sku = &mut skus[i];
                    sku.merged.boost_clock = sku.merged.boost_clock.or(cpu.boost_clock);
                    sku.merged.tdp = sku.merged.tdp.or(cpu.tdp);
                    sku.merged.launch_date = sku.merged.launch_date.or(cpu.launch_date);
                    sku.prices.extend(price);
                }
                None => {
                    index.insert(key, skus.len());
                    skus.push(Sku {
                        name,
                        merged: cpu.clone(),
                        prices: price.into_iter().collect(),
                    });
                }
            }
        }

        let records = skus
            .into_iter()
            .filter_map(|sku| {
                let launched = dates
                    .get(&cpu_key(sku.name))
                    .copied()
                    .or(sku.merged.launch_date);
                let record = PartRecord::new(
                    PartClass::Cpu,
                    sku.name,
                    vec![
                        (SpecKey::CoreCount, sku.merged.core_count.map(f64::from)),
                        (SpecKey::CoreClockGhz, sku.merged.core_clock),
                        (SpecKey::BoostClockGhz, sku.merged.boost_clock),
                        (SpecKey::TdpWatts, sku.merged.tdp),
                    ],
                    launched,
                    mean(sku.prices),
                );
                if record.is_none() {
                    debug!(name = sku.name, "dropping cpu with no specs and no price");
                }
                record
            })
            .collect::<Vec<_>>();

        info!(
            primary = primary.len(),
            launch_dates = dates.len(),
            records = records.len(),
            "reconciled cpus"
        );
        records
    }

    /// Reconcile GPUs.
    ///
    /// Listings are grouped by normalized chip name and memory size. A group survives only if
    /// the canonical catalog knows when that chip launched; its clocks are averaged and its
    /// price is the outlier-trimmed mean of the listed prices.
    pub fn gpus(&self, listings: &[RawGpuListing], catalog: &[RawGpuSeries]) -> Vec<PartRecord> {
        let mut canonical: HashMap<String, (LaunchDate, &RawGpuModel)> = HashMap::new();
        for model in catalog.iter().flat_map(|series| series.models.iter()) {
            let key = normalize(model.name.as_deref(), model.memory_gb);
            match model.launched() {
                Some(launched) if !key.is_empty() => {
                    canonical.insert(key, (launched, model));
                }
                _ => {}
            }
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<GpuGroup> = Vec::new();
        for listing in listings {
            let key = normalize(listing.identity(), listing.memory);
            if key.is_empty() {
                continue;
            }
            match index.get(&key).copied() {
                Some(i) => groups[i].members.push(listing),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(GpuGroup {
                        key,
                        members: vec![listing],
                    });
                }
            }
        }

        let mut unmatched = 0;
        let records = groups
            .into_iter()
            .filter_map(|group| {
                let (launched, model) = match canonical.get(&group.key) {
                    Some(&found) => found,
                    None => {
                        debug!(
                            key = %group.key,
                            listings = group.members.len(),
                            "dropping gpu group without a canonical launch date"
                        );
                        unmatched += 1;
                        return None;
                    }
                };

                let core_clock = mean(group.members.iter().filter_map(|l| l.core_clock))
                    .or(model.core_clock_mhz);
                let boost_clock = mean(group.members.iter().filter_map(|l| l.boost_clock))
                    .or(model.boost_clock_mhz);
                let memory = group.members[0].memory.or(model.memory_gb);
                let prices = group
                    .members
                    .iter()
                    .filter_map(|l| l.price)
                    .collect::<Vec<_>>();

                PartRecord::new(
                    PartClass::Gpu,
                    model.name.as_deref().unwrap_or_default(),
                    vec![
                        (SpecKey::MemoryGb, memory),
                        (SpecKey::CoreClockMhz, core_clock),
                        (SpecKey::BoostClockMhz, boost_clock),
                    ],
                    Some(launched),
                    trimmed_mean(&prices, self.config.outlier_trim_fraction),
                )
            })
            .collect::<Vec<_>>();

        info!(
            listings = listings.len(),
            canonical = canonical.len(),
            unmatched,
            records = records.len(),
            "reconciled gpus"
        );
        records
    }
}

/// [`Reconciler::cpus`] with default settings.
pub fn reconcile_cpus(launch_dates: &[RawCpu], priced: Option<&[RawCpu]>) -> Vec<PartRecord> {
    Reconciler::default().cpus(launch_dates, priced)
}

/// [`Reconciler::gpus`] with default settings.
pub fn reconcile_gpus(listings: &[RawGpuListing], catalog: &[RawGpuSeries]) -> Vec<PartRecord> {
    Reconciler::default().gpus(listings, catalog)
}
