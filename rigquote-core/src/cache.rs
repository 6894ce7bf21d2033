use anyhow::Context;
use tracing::{info, warn};

use crate::{
    common::{parse_or_zero, Client},
    config::SourcesConfig,
    modules::{cpu, gpu},
    normalize::normalize,
    reconcile::Reconciler,
    schemas::computing::{PartClass, PartRecord, SpecKey},
    source::{source_for, DataSource},
};

/// The four dataset documents feeding one [`PartCache`]. Only the CPU launch-date list and
/// the CPU price list are optional on their own; each class needs at least one dataset.
#[derive(Default)]
pub struct DatasetSources {
    pub cpu_launch_dates: Option<Box<dyn DataSource>>,
    pub cpu_prices: Option<Box<dyn DataSource>>,
    pub gpu_listings: Option<Box<dyn DataSource>>,
    pub gpu_catalog: Option<Box<dyn DataSource>>,
}

impl DatasetSources {
    pub fn from_config(config: &SourcesConfig, client: &Client) -> Self {
        let open = |location: &Option<String>| location.as_deref().map(|l| source_for(l, client));
        Self {
            cpu_launch_dates: open(&config.cpu_launch_dates),
            cpu_prices: open(&config.cpu_prices),
            gpu_listings: open(&config.gpu_listings),
            gpu_catalog: open(&config.gpu_catalog),
        }
    }
}

async fn fetch(source: Option<&dyn DataSource>) -> anyhow::Result<Option<String>> {
    match source {
        Some(source) => {
            let text = source
                .fetch()
                .await
                .with_context(|| format!("fetching {}", source.describe()))?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

async fn try_load_cpus(
    sources: &DatasetSources,
    reconciler: &Reconciler,
) -> anyhow::Result<Vec<PartRecord>> {
    let (dates, priced) = futures::future::join(
        fetch(sources.cpu_launch_dates.as_deref()),
        fetch(sources.cpu_prices.as_deref()),
    )
    .await;

    let (dates, priced) = match (dates?, priced?) {
        (None, None) => anyhow::bail!("no cpu dataset configured"),
        (dates, priced) => (dates, priced),
    };
    let dates = match dates {
        Some(text) => cpu::parse_dataset(&text)?,
        None => Vec::new(),
    };
    let priced = match priced {
        Some(text) => Some(cpu::parse_dataset(&text)?),
        None => None,
    };

    Ok(reconciler.cpus(&dates, priced.as_deref()))
}

async fn try_load_gpus(
    sources: &DatasetSources,
    reconciler: &Reconciler,
) -> anyhow::Result<Vec<PartRecord>> {
    let (listings, catalog) = futures::future::join(
        fetch(sources.gpu_listings.as_deref()),
        fetch(sources.gpu_catalog.as_deref()),
    )
    .await;

    let listings = listings?.context("no gpu listings dataset configured")?;
    let catalog = catalog?.context("no gpu catalog dataset configured")?;

    Ok(reconciler.gpus(
        &gpu::parse_listings(&listings)?,
        &gpu::parse_catalog(&catalog)?,
    ))
}

/// Reconciled records for one session. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PartCache {
    cpus: Vec<PartRecord>,
    gpus: Vec<PartRecord>,
}

impl PartCache {
    pub fn new(cpus: Vec<PartRecord>, gpus: Vec<PartRecord>) -> Self {
        Self { cpus, gpus }
    }

    /// Fetch and reconcile both part classes concurrently.
    ///
    /// A class whose datasets cannot be fetched or parsed ends up empty; that is logged, not
    /// returned, since an empty selection list is a valid state to show.
    pub async fn load(sources: &DatasetSources, reconciler: &Reconciler) -> Self {
        let (cpus, gpus) = tokio::join!(
            try_load_cpus(sources, reconciler),
            try_load_gpus(sources, reconciler)
        );

        let cpus = cpus.unwrap_or_else(|e| {
            warn!(error = %format!("{:#}", e), "cpu datasets unavailable");
            Vec::new()
        });
        let gpus = gpus.unwrap_or_else(|e| {
            warn!(error = %format!("{:#}", e), "gpu datasets unavailable");
            Vec::new()
        });

        info!(cpus = cpus.len(), gpus = gpus.len(), "part cache ready");
        Self { cpus, gpus }
    }

    pub fn cpus(&self) -> &[PartRecord] {
        &self.cpus
    }

    pub fn gpus(&self) -> &[PartRecord] {
        &self.gpus
    }

    pub fn records(&self, class: PartClass) -> &[PartRecord] {
        match class {
            PartClass::Cpu => &self.cpus,
            PartClass::Gpu => &self.gpus,
        }
    }

    /// Look a part up by display name (case-insensitive), then by normalized key.
    ///
    /// A GPU query without a memory size, e.g. `"RTX 3070"`, matches the first record of that
    /// chip whatever its memory. Records that share a name but not a base clock are told apart
    /// with a suffix: `"AMD Ryzen 5 3600 @ 3.5"` (GHz for CPUs, MHz for GPUs).
    pub fn find(&self, class: PartClass, query: &str) -> Option<&PartRecord> {
        let query = query.trim();
        if let Some((name, clock)) = query.rsplit_once('@') {
            let clock = parse_or_zero(clock);
            if clock > 0.0 {
                let spec = match class {
                    PartClass::Cpu => SpecKey::CoreClockGhz,
                    PartClass::Gpu => SpecKey::CoreClockMhz,
                };
                return self
                    .candidates(class, name.trim())
                    .into_iter()
                    .find(|r| (r.spec(spec) - clock).abs() < 1e-6);
            }
        }

        self.candidates(class, query).into_iter().next()
    }

    fn candidates(&self, class: PartClass, query: &str) -> Vec<&PartRecord> {
        let records = self.records(class);
        if query.is_empty() {
            return Vec::new();
        }

        let by_name = records
            .iter()
            .filter(|r| r.name().eq_ignore_ascii_case(query))
            .collect::<Vec<_>>();
        if !by_name.is_empty() {
            return by_name;
        }

        let lowered = query.to_lowercase();
        let key = normalize(Some(query), None);
        let by_key = records
            .iter()
            .filter(|r| r.normalized_key() == lowered || r.normalized_key() == key)
            .collect::<Vec<_>>();
        if !by_key.is_empty() || class != PartClass::Gpu || key.is_empty() {
            return by_key;
        }

        let family = format!("{}-", key);
        records
            .iter()
            .filter(|r| r.normalized_key().starts_with(&family))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetSources, PartCache};
    use crate::{
        reconcile::Reconciler,
        schemas::computing::{PartClass, PartRecord, SpecKey},
        source::{FileSource, StaticSource},
    };

    const CPU_DATES: &str = r#"[
        {"name": "AMD Ryzen 5 3600", "core_count": 6, "core_clock": 3.6, "boost_clock": 4.2, "launch_date": "2019-07-07"}
    ]"#;
    const CPU_PRICES: &str = r#"[
        {"name": "AMD Ryzen 5 3600", "core_count": 6, "core_clock": 3.6, "boost_clock": 4.2, "price": 95},
        {"name": "Intel Core i5-12400F", "core_count": 6, "core_clock": 2.5, "boost_clock": 4.4, "price": 110}
    ]"#;
    const GPU_LISTINGS: &str = r#"[
        {"name": "ASUS DUAL", "chipset": "GeForce RTX 3060", "memory": 12, "core_clock": 1320, "boost_clock": 1807, "price": 289},
        {"name": "MSI VENTUS 2X", "chipset": "GeForce RTX 3060", "memory": 8, "core_clock": 1320, "boost_clock": 1777, "price": 259}
    ]"#;
    const GPU_CATALOG: &str = r#"[{"models": [
        {"name": "GeForce RTX 3060", "memory_gb": 12, "release_year": 2021},
        {"name": "GeForce RTX 3060", "memory_gb": 8, "launch_date": "2022-10-27"}
    ]}]"#;

    fn sources() -> DatasetSources {
        DatasetSources {
            cpu_launch_dates: Some(Box::new(StaticSource(CPU_DATES.to_string()))),
            cpu_prices: Some(Box::new(StaticSource(CPU_PRICES.to_string()))),
            gpu_listings: Some(Box::new(StaticSource(GPU_LISTINGS.to_string()))),
            gpu_catalog: Some(Box::new(StaticSource(GPU_CATALOG.to_string()))),
        }
    }

    #[tokio::test]
    async fn test_load_and_find() {
        let cache = PartCache::load(&sources(), &Reconciler::default()).await;
        assert_eq!(cache.cpus().len(), 2);
        assert_eq!(cache.gpus().len(), 2);

        let ryzen = cache.find(PartClass::Cpu, "amd ryzen 5 3600").unwrap();
        assert!(ryzen.launch_date().is_some());
        assert_eq!(
            cache.find(PartClass::Cpu, "Core i5-12400F").unwrap().name(),
            "Intel Core i5-12400F"
        );

        assert_eq!(
            cache.find(PartClass::Gpu, "rtx 3060-8").unwrap().market_price(),
            Some(259.0)
        );
        assert_eq!(
            cache.find(PartClass::Gpu, "NVIDIA RTX 3060").unwrap().normalized_key(),
            "rtx 3060-12"
        );
        assert!(cache.find(PartClass::Gpu, "Radeon RX 7900 XTX").is_none());
        assert!(cache.find(PartClass::Cpu, "  ").is_none());
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        let mut broken = sources();
        broken.gpu_catalog = Some(Box::new(FileSource::new("/nonexistent/rigquote/gpu.json")));
        broken.cpu_launch_dates = Some(Box::new(StaticSource("{not json".to_string())));

        let cache = PartCache::load(&broken, &Reconciler::default()).await;
        assert!(cache.cpus().is_empty());
        assert!(cache.gpus().is_empty());

        let cache = PartCache::load(&DatasetSources::default(), &Reconciler::default()).await;
        assert!(cache.cpus().is_empty());
        assert!(cache.gpus().is_empty());
    }

    #[tokio::test]
    async fn test_prices_without_launch_dates() {
        let mut partial = sources();
        partial.cpu_launch_dates = None;

        let cache = PartCache::load(&partial, &Reconciler::default()).await;
        assert_eq!(cache.cpus().len(), 2);
        assert!(cache.cpus().iter().all(|cpu| cpu.launch_date().is_none()));
    }

    fn ryzen(core_clock: f64, price: f64) -> PartRecord {
        PartRecord::new(
            PartClass::Cpu,
            "AMD Ryzen 5 3600",
            vec![
                (SpecKey::CoreCount, Some(6.0)),
                (SpecKey::CoreClockGhz, Some(core_clock)),
            ],
            None,
            Some(price),
        )
        .unwrap()
    }

    #[test]
    fn test_find_same_name_by_clock() {
        let cache = PartCache::new(vec![ryzen(3.6, 100.0), ryzen(3.5, 80.0)], Vec::new());

        let plain = cache.find(PartClass::Cpu, "AMD Ryzen 5 3600").unwrap();
        assert_eq!(plain.market_price(), Some(100.0));

        let slower = cache.find(PartClass::Cpu, "AMD Ryzen 5 3600 @ 3.5").unwrap();
        assert_eq!(slower.market_price(), Some(80.0));
        assert_eq!(
            cache.find(PartClass::Cpu, "ryzen 5 3600@3.6").unwrap().market_price(),
            Some(100.0)
        );

        assert!(cache.find(PartClass::Cpu, "AMD Ryzen 5 3600 @ 4.0").is_none());
        /* a suffix that is no clock is part of the name */
        assert!(cache.find(PartClass::Cpu, "AMD Ryzen 5 3600 @ home").is_none());
    }
}
