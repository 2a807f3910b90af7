use lazy_static::lazy_static;
use regex::Regex;
use crate::error::ConfigError;

pub const KIB: u64 = 1 << 10;
pub const MIB: u64 = 1 << 20;
pub const GIB: u64 = 1 << 30;

lazy_static! {
    static ref SIZE_PATTERN: Regex = Regex::new(r"^\s*(?P<value>[0-9]+(?:\.[0-9]+)?)\s*(?P<unit>[A-Za-z]*)\s*$").unwrap();
}

/// Formats a byte count in B, KiB or MiB depending on its magnitude
///
/// Whole values are printed without decimals, anything else with at most two
///
/// # Examples
///
/// ```
/// use latencylib::util::format_bytes;
/// assert_eq!(format_bytes(32768), "32 KiB");
/// assert_eq!(format_bytes(1536 * 1024), "1.5 MiB");
/// assert_eq!(format_bytes(100), "100 B");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    if bytes < KIB {
        return format!("{bytes} B");
    }
    let kib = bytes as f64 / KIB as f64;
    // Values which round up to 1024 KiB are shown as MiB
    let (value, unit) = if round_to_hundredths(kib) < 1024.0 {
        (kib, "KiB")
    } else {
        (bytes as f64 / MIB as f64, "MiB")
    };
    let digits = format!("{value:.2}");
    let digits = digits.trim_end_matches('0').trim_end_matches('.');
    format!("{digits} {unit}")
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a human readable size such as `192KiB`, `1.5 MiB` or `4096` into bytes
///
/// Units are binary and case insensitive, `K`, `KB` and `KiB` all mean 1024 bytes. Fractional
/// values are rounded down to a whole number of bytes
///
/// # Examples
///
/// ```
/// use latencylib::util::parse_size;
/// assert_eq!(parse_size("1.5MiB").unwrap(), 1572864);
/// assert_eq!(parse_size("192 kib").unwrap(), 196608);
/// assert!(parse_size("lots").is_err());
/// ```
pub fn parse_size(text: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::InvalidSize(text.to_string());
    let captures = SIZE_PATTERN.captures(text).ok_or_else(invalid)?;
    let value = &captures["value"];
    let multiplier = match captures["unit"].to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => MIB,
        "g" | "gb" | "gib" => GIB,
        _ => return Err(invalid()),
    };
    if value.contains('.') {
        let bytes = value.parse::<f64>().map_err(|_| invalid())? * multiplier as f64;
        if bytes > u64::MAX as f64 {
            return Err(invalid());
        }
        Ok(bytes.floor() as u64)
    } else {
        value.parse::<u64>()
            .ok()
            .and_then(|v| v.checked_mul(multiplier))
            .ok_or_else(invalid)
    }
}
