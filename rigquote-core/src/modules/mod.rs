//! Raw dataset shapes, one module per part class.
//!
//! Every field is optional and parsed leniently: sources give numbers as strings, prices with
//! currency symbols and dates as bare years. Reconciliation decides what is usable.

pub mod cpu;
pub mod gpu;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Parse a JSON document holding a list of entries, either as a top-level array or wrapped
/// as `{"data": [...]}`. Entries that fail to deserialize are skipped.
///
/// # Errors
/// Errors if the document is not JSON or holds no list.
pub(crate) fn parse_entries<T: DeserializeOwned>(text: &str, what: &str) -> anyhow::Result<Vec<T>> {
    let document: Value =
        serde_json::from_str(text).with_context(|| format!("{} dataset is not valid JSON", what))?;

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(entries)) => entries,
            _ => bail!("{} dataset has no list of entries", what),
        },
        _ => bail!("{} dataset has no list of entries", what),
    };

    let total = entries.len();
    let parsed = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect::<Vec<T>>();

    if parsed.len() < total {
        warn!(
            dataset = what,
            skipped = total - parsed.len(),
            "skipped malformed dataset entries"
        );
    }

    Ok(parsed)
}
