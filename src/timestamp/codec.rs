//! Timestamp codec
//!
//! Integer value + `FormatTag` → display string.
//!
//! `convert` is total: it never fails and never panics. A value that is not a
//! number comes back as its own text; a number that cannot be placed on the
//! calendar comes back as `conversion error: <detail>`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

use crate::value::Value;

use super::FormatTag;

/// Arrow the viewer prefixes to some rendered values; stripped before parsing
pub const DECORATIVE_MARKER: char = '➡';

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MILLI: i64 = 1_000;

/// Why a value could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Value is not an integer even after stripping the marker
    #[error("not a numeric value: {0:?}")]
    NotNumeric(String),

    /// Real value is NaN, infinite, or outside the i64 range
    #[error("real value {0} cannot be used as an integer timestamp")]
    NotIntegral(String),

    /// Epoch arithmetic left chrono's representable range
    #[error("{value} is out of range for {format}")]
    OutOfRange { value: i64, format: String },

    /// Unrecognized format tag name
    #[error("unknown timestamp format: {0}")]
    UnknownFormat(String),
}

/// Reference points the encodings count from
#[derive(Debug, Clone, Copy)]
enum Epoch {
    Unix,
    Cocoa,
    Windows,
}

impl Epoch {
    fn start(self) -> DateTime<Utc> {
        let (y, m, d) = match self {
            Epoch::Unix => (1970, 1, 1),
            Epoch::Cocoa => (2001, 1, 1),
            Epoch::Windows => (1601, 1, 1),
        };
        // All three dates are valid and unambiguous in UTC
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Convert a cell value for display, degrading every failure to a string
pub fn convert(value: &Value, format: FormatTag) -> String {
    match try_convert(value, format) {
        Ok(s) => s,
        Err(ConversionError::NotNumeric(original)) => original,
        Err(e) => format!("conversion error: {}", e),
    }
}

/// Convert an integer for display
pub fn convert_i64(value: i64, format: FormatTag) -> String {
    convert(&Value::Integer(value), format)
}

/// Convert a cell value, reporting failures as `ConversionError`
pub fn try_convert(value: &Value, format: FormatTag) -> Result<String, ConversionError> {
    let raw = to_integer(value)?;

    match format {
        FormatTag::Jst => render_in_zone(raw, Epoch::Unix, format, chrono_tz::Asia::Tokyo),
        FormatTag::Utc | FormatTag::Gmt => {
            let instant = offset_micros(Epoch::Unix, raw, format)?;
            Ok(instant.format(DISPLAY_FORMAT).to_string())
        }
        FormatTag::Zone(tz) => render_in_zone(raw, Epoch::Unix, format, tz),
        FormatTag::UnixMicrosecond => Ok(raw.to_string()),
        FormatTag::UnixMillisecond => Ok(raw.div_euclid(MICROS_PER_MILLI).to_string()),
        FormatTag::UnixSecond => Ok(raw.div_euclid(MICROS_PER_SECOND).to_string()),
        FormatTag::Mac | FormatTag::Cocoa => {
            render_in_zone(raw, Epoch::Cocoa, format, chrono_tz::Asia::Tokyo)
        }
        // Firefox places.sqlite counts microseconds from 1970, not 1601.
        // FIREFOX stays on the WebKit epoch the viewer has always used.
        FormatTag::Webkit | FormatTag::Chrome | FormatTag::Firefox => {
            render_in_zone(raw, Epoch::Windows, format, chrono_tz::Asia::Tokyo)
        }
        FormatTag::Filetime => {
            let instant = offset_filetime(raw, format)?;
            Ok(instant.with_timezone(&chrono_tz::Asia::Tokyo).format(DISPLAY_FORMAT).to_string())
        }
    }
}

/// Render a value under every tag of the detail panel
pub fn describe(value: &Value) -> Vec<(FormatTag, String)> {
    FormatTag::detail_set()
        .into_iter()
        .map(|tag| (tag, convert(value, tag)))
        .collect()
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Coerce a cell to the integer the encodings operate on
fn to_integer(value: &Value) -> Result<i64, ConversionError> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::Real(f) => {
            let truncated = f.trunc();
            // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
            if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Ok(truncated as i64)
            } else {
                Err(ConversionError::NotIntegral(f.to_string()))
            }
        }
        other => {
            let text = other.to_text_lossy();
            text.replace(DECORATIVE_MARKER, "")
                .trim()
                .parse::<i64>()
                .map_err(|_| ConversionError::NotNumeric(text))
        }
    }
}

fn render_in_zone(micros: i64, epoch: Epoch, format: FormatTag, zone: Tz) -> Result<String, ConversionError> {
    let instant = offset_micros(epoch, micros, format)?;
    Ok(instant.with_timezone(&zone).format(DISPLAY_FORMAT).to_string())
}

fn offset_micros(epoch: Epoch, micros: i64, format: FormatTag) -> Result<DateTime<Utc>, ConversionError> {
    epoch
        .start()
        .checked_add_signed(Duration::microseconds(micros))
        .ok_or_else(|| out_of_range(micros, format))
}

/// FILETIME ticks are 100 ns; split so the multiplication cannot overflow
fn offset_filetime(ticks: i64, format: FormatTag) -> Result<DateTime<Utc>, ConversionError> {
    let micros = Duration::microseconds(ticks / 10);
    let nanos = Duration::nanoseconds((ticks % 10) * 100);
    let delta = micros
        .checked_add(&nanos)
        .ok_or_else(|| out_of_range(ticks, format))?;

    Epoch::Windows
        .start()
        .checked_add_signed(delta)
        .ok_or_else(|| out_of_range(ticks, format))
}

fn out_of_range(value: i64, format: FormatTag) -> ConversionError {
    ConversionError::OutOfRange {
        value,
        format: format.to_string(),
    }
}
