//! Canonical keys for matching the same part across datasets.
//!
//! Sources disagree on vendor prefixes, board-partner branding and whether the memory size is
//! part of the name. A key keeps only the model tokens: `"ASUS TUF Gaming GeForce RTX 3070 OC 8GB"`
//! and `"NVIDIA GeForce RTX 3070"` (8 GB) both become `"rtx 3070-8"`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_TRADEMARK: Regex = Regex::new(r"(?i)\((?:tm|r)\)|[®™]").unwrap();
    static ref RE_BRAND: Regex = Regex::new(
        r"(?i)\b(?:intel|amd|nvidia|ati|asus|msi|gigabyte|evga|zotac|sapphire|xfx|powercolor|asrock|pny|palit|gainward|inno3d|galax|kfa2|colorful|biostar|sparkle|yeston|manli|visiontek)\b"
    )
    .unwrap();
    static ref RE_SERIES: Regex = Regex::new(
        r"(?i)\b(?:core|geforce|radeon|gaming|oc|dual|twin|edge|ventus|eagle|windforce|strix|tuf|rog|aorus|ftw3|xc3|xc|sc|amp|trinity|pulse|nitro|phantom|founders|edition|graphics card|video card)\b"
    )
    .unwrap();
    static ref RE_MEMORY: Regex =
        Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*gb\b|\bg?ddr\d+x?\b").unwrap();
}

/// Canonicalize a free-text part name. `memory_gb` disambiguates GPUs that share a chip but
/// not a memory configuration; pass `None` for CPUs.
///
/// Never fails: a missing name yields an empty key.
pub fn normalize(raw: Option<&str>, memory_gb: Option<f64>) -> String {
    let raw = match raw {
        Some(raw) => raw,
        None => return String::new(),
    };

    let stripped = RE_TRADEMARK.replace_all(raw, " ");
    let stripped = RE_BRAND.replace_all(&stripped, " ");
    let stripped = RE_SERIES.replace_all(&stripped, " ");
    let stripped = RE_MEMORY.replace_all(&stripped, " ");

    let base = stripped
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| matches!(c, '-' | ',' | '/' | '|')))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match memory_gb.filter(|gb| gb.is_finite() && *gb > 0.0) {
        Some(gb) if !base.is_empty() => format!("{}-{}", base, format_gb(gb)),
        _ => base,
    }
}

pub fn cpu_key(name: &str) -> String {
    normalize(Some(name), None)
}

pub fn gpu_key(name: &str, memory_gb: f64) -> String {
    normalize(Some(name), Some(memory_gb))
}

fn format_gb(gb: f64) -> String {
    if gb.fract() == 0.0 {
        format!("{:.0}", gb)
    } else {
        format!("{}", gb)
    }
}

#[cfg(test)]
mod tests {
    use super::{cpu_key, gpu_key, normalize};

    #[test]
    fn test_case_insensitive_prefix_strip() {
        assert_eq!(cpu_key("Intel Core i7-9700K"), cpu_key("intel core i7-9700k"));
        assert_eq!(cpu_key("Intel Core i7-9700K"), "i7-9700k");
        assert_eq!(cpu_key("Intel(R) Core(TM) i7-9700K"), "i7-9700k");
        assert_eq!(cpu_key("AMD Ryzen 5 3600"), "ryzen 5 3600");
    }

    #[test]
    fn test_gpu_memory_suffix() {
        assert_eq!(gpu_key("NVIDIA GeForce RTX 3070", 8.0), "rtx 3070-8");
        assert_eq!(
            gpu_key("ASUS TUF Gaming GeForce RTX 3070 OC 8GB", 8.0),
            "rtx 3070-8"
        );
        assert_ne!(gpu_key("GeForce RTX 3060", 8.0), gpu_key("GeForce RTX 3060", 12.0));
        assert_eq!(gpu_key("Radeon RX 6500 XT", 4.0), "rx 6500 xt-4");
        assert_eq!(gpu_key("GeForce GT 1030", 2.5), "gt 1030-2.5");
    }

    #[test]
    fn test_whole_word_only() {
        /* "oc" and "sc" must not be cut out of a longer token */
        assert_eq!(cpu_key("Xeon Gold 6134"), "xeon gold 6134");
        assert_eq!(cpu_key("Opteron 6376"), "opteron 6376");
        assert_eq!(gpu_key("GeForce GTX 1080 Ti", 11.0), "gtx 1080 ti-11");
        assert_eq!(
            gpu_key("MSI RTX 3080 Ti SUPRIM X 12GB GDDR6X", 12.0),
            "rtx 3080 ti suprim x-12"
        );
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(normalize(None, Some(8.0)), "");
        assert_eq!(normalize(Some("   "), None), "");
        assert_eq!(normalize(Some("EVGA"), Some(8.0)), "");
        assert_eq!(normalize(Some("GeForce RTX 3070"), Some(f64::NAN)), "rtx 3070");
    }
}
