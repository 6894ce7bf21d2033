use anyhow::bail;
use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt::Display, str::FromStr};

/// A currency - the unit an offer is quoted in.
///
/// There is no conversion between currencies: the datasets are priced in one unit and the
/// quote is labelled with whatever the deployment is configured to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum Currency {
    USD,
    EUR,
}

impl Currency {
    /// Given an abbreviation/symbol, try to return the corresponding [`Currency`].
    pub fn from_abbreviation<S: AsRef<str>>(s: S) -> Option<Self> {
        match s
            .as_ref()
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .as_str()
        {
            "$" | "us" | "usd" | "us$" => Some(Self::USD),
            "€" | "eur" | "euro" => Some(Self::EUR),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::EUR
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from_abbreviation(s) {
            Some(thing) => Ok(thing),
            None => bail!("no such currency: {}", s),
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::USD => "USD",
                Self::EUR => "EUR",
            }
        )
    }
}

/// Some amount of a [`Currency`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Money {
    pub unit: Currency,
    pub amount: f64,
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.unit {
            Currency::USD => write!(f, "{}{:.2}", self.unit.symbol(), self.amount),
            Currency::EUR => write!(f, "{:.2} {}", self.amount, self.unit.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Currency, Money};

    #[test]
    fn test_currency_abbreviations() {
        assert_eq!(Currency::from_abbreviation("usd"), Some(Currency::USD));
        assert_eq!(Currency::from_abbreviation(" $ "), Some(Currency::USD));
        assert_eq!(Currency::from_abbreviation("EUR"), Some(Currency::EUR));
        assert_eq!(Currency::from_abbreviation("€"), Some(Currency::EUR));
        assert_eq!(Currency::from_abbreviation("gbp"), None);
        assert!("yen".parse::<Currency>().is_err());
    }

    #[test]
    fn test_money_display() {
        let eur = Money {
            unit: Currency::EUR,
            amount: 312.5,
        };
        assert_eq!(eur.to_string(), "312.50 €");

        let usd = Money {
            unit: Currency::USD,
            amount: 42.0,
        };
        assert_eq!(usd.to_string(), "$42.00");
    }
}
