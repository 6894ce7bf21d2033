use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

use crate::{
    common::{Dollars, IgnoreComma},
    schemas::computing::LaunchDate,
};

/// One retail listing of a graphics card. Several listings (board partners, colors) usually
/// describe the same chip.
///
/// Accepts both the flat listing shape (`name, chipset, core_clock, boost_clock, memory, price`)
/// and the spelled-out one (`name, brand, color, length, memory_gb, core_clock_mhz,
/// boost_clock_mhz, price_usd`). Clocks are in MHz, memory in GB.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGpuListing {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub chipset: Option<String>,
    #[serde(default, alias = "memory_gb")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub memory: Option<f64>,
    #[serde(default, alias = "core_clock_mhz")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub core_clock: Option<f64>,
    #[serde(default, alias = "boost_clock_mhz")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub boost_clock: Option<f64>,
    #[serde(default, alias = "price_usd")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<Dollars>)>>")]
    pub price: Option<f64>,
}

impl RawGpuListing {
    /// The name that identifies the chip. Partner listings put the card name in `name` and the
    /// chip in `chipset`, so the chipset wins when present.
    pub fn identity(&self) -> Option<&str> {
        self.chipset
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.name.as_deref())
    }
}

/// One reference model from the canonical GPU catalog.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGpuModel {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde(default, alias = "memory")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub memory_gb: Option<f64>,
    #[serde(default, alias = "core_clock")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub core_clock_mhz: Option<f64>,
    #[serde(default, alias = "boost_clock")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub boost_clock_mhz: Option<f64>,
    #[serde(default, alias = "price")]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<Dollars>)>>")]
    pub price_usd: Option<f64>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub launch_date: Option<LaunchDate>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<DisplayFromStr>)>>")]
    pub release_year: Option<i32>,
}

impl RawGpuModel {
    /// The launch date, falling back to January 1 of `release_year`.
    pub fn launched(&self) -> Option<LaunchDate> {
        self.launch_date
            .or_else(|| self.release_year.map(LaunchDate::Year))
    }
}

/// A named family of models in the canonical catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGpuSeries {
    #[serde(default, alias = "series")]
    pub name: Option<String>,
    #[serde(default)]
    pub models: Vec<RawGpuModel>,
}

/// Parse a GPU listings document.
///
/// # Errors
/// Errors if the document is not a JSON list of entries.
pub fn parse_listings(text: &str) -> anyhow::Result<Vec<RawGpuListing>> {
    super::parse_entries(text, "gpu listings")
}

/// Parse the canonical GPU catalog document.
///
/// # Errors
/// Errors if the document is not a JSON list of series.
pub fn parse_catalog(text: &str) -> anyhow::Result<Vec<RawGpuSeries>> {
    super::parse_entries(text, "gpu catalog")
}

#[cfg(test)]
mod tests {
    use super::{parse_catalog, parse_listings};
    use crate::schemas::computing::LaunchDate;
    use chrono::NaiveDate;

    #[test]
    fn test_both_listing_shapes() {
        let listings = parse_listings(
            r#"[
                {"name": "ASUS DUAL", "chipset": "GeForce RTX 3070", "memory": 8,
                 "core_clock": 1500, "boost_clock": "1,755", "price": 499.99, "color": "Black"},
                {"name": "MSI GeForce RTX 3070 VENTUS", "brand": "MSI", "memory_gb": 8,
                 "core_clock_mhz": 1500, "boost_clock_mhz": 1725, "price_usd": "$529.00", "length": 232}
            ]"#,
        )
        .unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].identity(), Some("GeForce RTX 3070"));
        assert_eq!(listings[0].boost_clock, Some(1755.0));
        assert_eq!(listings[1].identity(), Some("MSI GeForce RTX 3070 VENTUS"));
        assert_eq!(listings[1].memory, Some(8.0));
        assert_eq!(listings[1].price, Some(529.0));
    }

    #[test]
    fn test_catalog_release_year_fallback() {
        let catalog = parse_catalog(
            r#"[
                {"series": "GeForce 30", "models": [
                    {"name": "GeForce RTX 3070", "memory_gb": 8, "core_clock_mhz": 1500,
                     "boost_clock_mhz": 1725, "price_usd": 499, "launch_date": "2020-10-29"},
                    {"name": "GeForce RTX 3060", "memory_gb": 12, "release_year": "2021"},
                    {"name": "GeForce RTX 3050", "memory_gb": 8}
                ]}
            ]"#,
        )
        .unwrap();

        let models = &catalog[0].models;
        assert_eq!(catalog[0].name.as_deref(), Some("GeForce 30"));
        assert_eq!(
            models[0].launched(),
            Some(LaunchDate::Day(NaiveDate::from_ymd_opt(2020, 10, 29).unwrap()))
        );
        assert_eq!(models[1].launched(), Some(LaunchDate::Year(2021)));
        assert_eq!(models[2].launched(), None);
    }
}
