use anyhow::bail;
use chrono::{DateTime, NaiveDate};
use serde::{de::Visitor, Deserialize, Serialize, Serializer};
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use crate::normalize::{cpu_key, gpu_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartClass {
    Cpu,
    Gpu,
}

impl Display for PartClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Cpu => "CPU",
                Self::Gpu => "GPU",
            }
        )
    }
}

/// A numeric attribute of a part. CPU clocks are in GHz, GPU clocks in MHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecKey {
    CoreCount,
    CoreClockGhz,
    BoostClockGhz,
    TdpWatts,
    MemoryGb,
    CoreClockMhz,
    BoostClockMhz,
}

/// When a part launched. Some sources only know the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LaunchDate {
    Day(NaiveDate),
    Year(i32),
}

impl LaunchDate {
    /// A bare year is read as January 1 of that year.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match *self {
            Self::Day(day) => Some(day),
            Self::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
        }
    }
}

impl FromStr for LaunchDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self::Year(s.parse()?));
        }
        if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::Day(day));
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Day(stamp.date_naive()));
        }
        /* "2020-06" */
        if let Ok(day) = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d") {
            return Ok(Self::Day(day));
        }
        bail!("unrecognized launch date: {:?}", s)
    }
}

impl Display for LaunchDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            Self::Year(year) => write!(f, "{}", year),
        }
    }
}

impl Serialize for LaunchDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LaunchDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Helper;

        impl<'de> Visitor<'de> for Helper {
            type Value = LaunchDate;

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i32::try_from(v)
                    .map(LaunchDate::Year)
                    .map_err(|_| E::custom("year out of range"))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i32::try_from(v)
                    .map(LaunchDate::Year)
                    .map_err(|_| E::custom("year out of range"))
            }

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a date like \"2020-06-01\" or a year")
            }
        }

        deserializer.deserialize_any(Helper)
    }
}

fn serialize_launch_date<S: Serializer>(
    date: &Option<LaunchDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => date.serialize(serializer),
        None => serializer.serialize_str("Unknown"),
    }
}

/// One canonical, deduplicated part model.
///
/// Built once by the reconciler and never changed afterwards; the fields are only readable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartRecord {
    class: PartClass,
    name: String,
    #[serde(skip)]
    normalized_key: String,
    specs: BTreeMap<SpecKey, f64>,
    #[serde(serialize_with = "serialize_launch_date")]
    launch_date: Option<LaunchDate>,
    market_price: Option<f64>,
}

impl PartRecord {
    /// Build a record, dropping spec values and prices that are not finite and positive.
    ///
    /// Returns `None` for an empty name, or for a record with no known spec and no price,
    /// since neither can be valued.
    pub fn new(
        class: PartClass,
        name: &str,
        specs: impl IntoIterator<Item = (SpecKey, Option<f64>)>,
        launch_date: Option<LaunchDate>,
        market_price: Option<f64>,
    ) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let specs = specs
            .into_iter()
            .filter_map(|(key, value)| Some((key, value.filter(|v| v.is_finite() && *v > 0.0)?)))
            .collect::<BTreeMap<_, _>>();
        let market_price = market_price.filter(|p| p.is_finite() && *p > 0.0);

        if specs.is_empty() && market_price.is_none() {
            return None;
        }

        let normalized_key = match class {
            PartClass::Cpu => cpu_key(name),
            PartClass::Gpu => gpu_key(name, specs.get(&SpecKey::MemoryGb).copied().unwrap_or(0.0)),
        };

        Some(Self {
            class,
            name: name.to_string(),
            normalized_key,
            specs,
            launch_date,
            market_price,
        })
    }

    pub fn class(&self) -> PartClass {
        self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normalized_key(&self) -> &str {
        &self.normalized_key
    }

    /// A spec value, or `0.0` if the source never gave one.
    pub fn spec(&self, key: SpecKey) -> f64 {
        self.known_spec(key).unwrap_or(0.0)
    }

    pub fn known_spec(&self, key: SpecKey) -> Option<f64> {
        self.specs.get(&key).copied()
    }

    pub fn specs(&self) -> &BTreeMap<SpecKey, f64> {
        &self.specs
    }

    pub fn launch_date(&self) -> Option<LaunchDate> {
        self.launch_date
    }

    pub fn market_price(&self) -> Option<f64> {
        self.market_price
    }
}
