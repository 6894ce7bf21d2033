use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError, DisplayFromStr, PickFirst};

use crate::{
    common::{Dollars, IgnoreComma},
    schemas::computing::LaunchDate,
};

/// One entry of a CPU dataset.
///
/// Covers both shapes in circulation: the launch-date list
/// (`name, core_count, core_clock, boost_clock, launch_date`) and the priced parts list
/// (`name, core_count, core_clock, boost_clock, price, tdp, graphics, smt`).
/// Clocks are in GHz.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCpu {
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<DisplayFromStr>)>>")]
    pub core_count: Option<u32>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub core_clock: Option<f64>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub boost_clock: Option<f64>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<Dollars>)>>")]
    pub price: Option<f64>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError<PickFirst<(_, Option<IgnoreComma<f64>>)>>")]
    pub tdp: Option<f64>,
    #[serde(default, alias = "release_date")]
    #[serde_as(as = "DefaultOnError")]
    pub launch_date: Option<LaunchDate>,
}

/// Parse a CPU dataset document.
///
/// # Errors
/// Errors if the document is not a JSON list of entries.
pub fn parse_dataset(text: &str) -> anyhow::Result<Vec<RawCpu>> {
    super::parse_entries(text, "cpu")
}

#[cfg(test)]
mod tests {
    use super::parse_dataset;
    use crate::schemas::computing::LaunchDate;

    #[test]
    fn test_priced_list() {
        let cpus = parse_dataset(
            r#"[
                {"name": "AMD Ryzen 5 3600", "price": 95.99, "core_count": 6, "core_clock": 3.6,
                 "boost_clock": 4.2, "tdp": 65, "graphics": null, "smt": true},
                {"name": "Intel Core i3-10100F", "price": "$74.00", "core_count": "4",
                 "core_clock": "3.6", "boost_clock": null, "tdp": 65, "graphics": null, "smt": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(cpus.len(), 2);
        assert_eq!(cpus[0].price, Some(95.99));
        assert_eq!(cpus[0].tdp, Some(65.0));
        assert_eq!(cpus[1].price, Some(74.0));
        assert_eq!(cpus[1].core_count, Some(4));
        assert_eq!(cpus[1].core_clock, Some(3.6));
        assert_eq!(cpus[1].boost_clock, None);
        assert_eq!(cpus[1].launch_date, None);
    }

    #[test]
    fn test_launch_date_list() {
        let cpus = parse_dataset(
            r#"{"data": [
                {"name": "AMD Ryzen 5 3600", "core_count": 6, "core_clock": 3.6, "boost_clock": 4.2,
                 "launch_date": "2019-07-07"},
                {"name": "Intel Core i7-4790K", "core_count": 4, "launch_date": 2014},
                {"name": "Mystery Chip", "launch_date": "Unknown"},
                "not an entry"
            ]}"#,
        )
        .unwrap();

        assert_eq!(cpus.len(), 3);
        assert_eq!(cpus[1].launch_date, Some(LaunchDate::Year(2014)));
        assert_eq!(cpus[2].launch_date, None);
        assert_eq!(cpus[2].core_count, None);
    }

    #[test]
    fn test_malformed_document() {
        assert!(parse_dataset("").is_err());
        assert!(parse_dataset(r#"{"cpus": []}"#).is_err());
        assert!(parse_dataset("42").is_err());
        assert!(parse_dataset("[]").unwrap().is_empty());
    }
}
