/*!
 * Timestamp normalization for hand-annotated subtitle files.
 *
 * Annotation timestamps are free-form: OCR noise, missing components and
 * metadata markers all show up in real files. Everything here degrades to
 * "invalid" or zero seconds instead of failing.
 */

use once_cell::sync::Lazy;
use regex::Regex;

// @const: Anything that cannot be part of a timestamp
static NON_TIMESTAMP_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d:.]").unwrap());

/// Metadata markers that annotators put in place of a timestamp
const METADATA_MARKERS: [&str; 4] = ["#", "@", "-", "*"];

// @struct: Timestamp cleaning and conversion
pub struct TimestampNormalizer;

impl TimestampNormalizer {
    /// Strip everything except digits, colons and periods, then repair a
    /// lone colon at either end (`":30"` becomes `"0:30"`, `"12:"` becomes `"12:00"`).
    pub fn clean(raw: &str) -> String {
        let mut cleaned = NON_TIMESTAMP_CHARS.replace_all(raw, "").into_owned();

        if cleaned.matches(':').count() == 1 {
            if cleaned.starts_with(':') {
                cleaned.insert(0, '0');
            } else if cleaned.ends_with(':') {
                cleaned.push_str("00");
            }
        }

        cleaned
    }

    /// Whether a timestamp string is usable at all.
    ///
    /// Anything with a colon and at least one digit passes; otherwise the
    /// string must parse as a plain decimal number.
    pub fn is_valid(timestamp: &str) -> bool {
        if timestamp.is_empty() || METADATA_MARKERS.contains(&timestamp) {
            return false;
        }

        if !timestamp.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }

        if timestamp.contains(':') {
            return true;
        }

        timestamp.trim().parse::<f64>().is_ok()
    }

    /// Convert a raw timestamp to seconds; 0.0 for anything unusable.
    ///
    /// Accepts `SS`, `MM:SS` and `HH:MM:SS`, where hours and minutes are
    /// integers and seconds may carry a fraction.
    pub fn to_seconds(raw: &str) -> f64 {
        if raw.is_empty() || !Self::is_valid(raw) {
            return 0.0;
        }

        let cleaned = Self::clean(raw);
        if cleaned.is_empty() {
            return 0.0;
        }

        let parts: Vec<&str> = cleaned.split(':').collect();
        let seconds = match parts.as_slice() {
            [s] => s.parse::<f64>().ok(),
            [m, s] => Self::parse_components(None, m, s),
            [h, m, s] => Self::parse_components(Some(h), m, s),
            _ => None,
        };

        seconds.unwrap_or(0.0)
    }

    fn parse_components(hours: Option<&str>, minutes: &str, seconds: &str) -> Option<f64> {
        let hours = match hours {
            Some(h) => h.parse::<u64>().ok()?,
            None => 0,
        };
        let minutes = minutes.parse::<u64>().ok()?;
        let seconds = seconds.parse::<f64>().ok()?;

        let whole = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
        Some(whole as f64 + seconds)
    }
}
