use anyhow::Context;
use serde::de::Visitor;
use serde_with::DeserializeAs;
use std::{marker::PhantomData, str::FromStr};

/// Convert something like "$312.03" to 312.03
///
/// ## Example
/// ```txt
/// "$312.03"   -> 312.03
/// "312.03"    -> 312.03
/// "312"       -> 312.0
/// "$1,299.99" -> 1299.99
/// ```
pub(crate) fn parse_dollars<T: AsRef<str>>(s: T) -> Option<f64> {
    s.as_ref()
        .chars()
        .filter(|c| c.is_numeric() || *c == '.')
        .collect::<String>()
        .parse::<f64>()
        .ok()
}

/// Parse a user-typed number, treating anything unparseable (or non-finite) as `0.0`.
///
/// Form fields arrive as free text, so `""`, `"abc"` and `"NaN"` all mean "nothing entered".
pub fn parse_or_zero<T: AsRef<str>>(s: T) -> f64 {
    s.as_ref()
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .map(finite_or_zero)
        .unwrap_or(0.0)
}

/// Clamp a computed amount to a finite, non-negative value.
pub fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Ignore commas when parsing number formats.
/// e.g. 13,096,340.3 -> 13096340.3
pub struct IgnoreComma<T>
where
    T: FromStr,
{
    _t: PhantomData<T>,
}

impl<'de, T> DeserializeAs<'de, T> for IgnoreComma<T>
where
    T: FromStr,
{
    fn deserialize_as<D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Helper<TT>
        where
            TT: FromStr,
        {
            _tt: PhantomData<TT>,
        }

        impl<'de, TT> Visitor<'de> for Helper<TT>
        where
            TT: FromStr,
        {
            type Value = TT;

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                TT::from_str(v.trim().replace(',', "").as_str())
                    .map_err(|_| E::custom("format error while parsing in IgnoreComma"))
            }

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_fmt(format_args!("a FromStr (probably number), ignoring commas"))
            }
        }

        deserializer.deserialize_str(Helper::<T> { _tt: PhantomData })
    }
}

/// A price written as text, with or without a currency symbol.
/// Uses [`parse_dollars`], so `"$1,299.99"` becomes `1299.99`.
pub struct Dollars;

impl<'de> DeserializeAs<'de, f64> for Dollars {
    fn deserialize_as<D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Helper;

        impl<'de> Visitor<'de> for Helper {
            type Value = f64;

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                parse_dollars(v).ok_or_else(|| E::custom("could not parse currency amount"))
            }

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a price such as \"$312.03\"")
            }
        }

        deserializer.deserialize_str(Helper)
    }
}

/// A wrapped [`reqwest::Client`] used to fetch the part datasets.
/// None of the dataset hosts need a session, so the cookie store stays off.
pub struct Client(pub reqwest::Client);

impl Client {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self(
            reqwest::Client::builder()
                .user_agent(concat!("rigquote/", env!("CARGO_PKG_VERSION")))
                .build()
                .context("could not build http client")?,
        ))
    }
}
