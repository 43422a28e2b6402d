//! Format tags
//!
//! Closed set of timestamp encodings and display zones.

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;

use super::ConversionError;

/// Selects the epoch/unit interpretation and the display zone of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// Microseconds since 1970, rendered in Asia/Tokyo
    Jst,
    /// Microseconds since 1970, rendered in UTC
    Utc,
    /// Microseconds since 1970, rendered in GMT
    Gmt,
    /// Microseconds since 1970, rendered in a named IANA zone
    Zone(Tz),
    UnixSecond,
    UnixMillisecond,
    UnixMicrosecond,
    /// HFS+ style, microseconds since 2001-01-01
    Mac,
    /// Core Data, microseconds since 2001-01-01
    Cocoa,
    /// Windows FILETIME, 100 ns ticks since 1601-01-01
    Filetime,
    /// Microseconds since 1601-01-01
    Webkit,
    Chrome,
    Firefox,
}

impl FormatTag {
    /// Every tag that has no zone parameter
    pub const FIXED: [FormatTag; 12] = [
        FormatTag::Jst,
        FormatTag::Utc,
        FormatTag::Gmt,
        FormatTag::UnixSecond,
        FormatTag::UnixMillisecond,
        FormatTag::UnixMicrosecond,
        FormatTag::Mac,
        FormatTag::Cocoa,
        FormatTag::Filetime,
        FormatTag::Webkit,
        FormatTag::Chrome,
        FormatTag::Firefox,
    ];

    /// Canonical tag name
    pub fn name(&self) -> &'static str {
        match self {
            FormatTag::Jst => "JST",
            FormatTag::Utc => "UTC",
            FormatTag::Gmt => "GMT",
            FormatTag::Zone(tz) => tz.name(),
            FormatTag::UnixSecond => "UNIX_second",
            FormatTag::UnixMillisecond => "UNIX_millisecond",
            FormatTag::UnixMicrosecond => "UNIX_microsecond",
            FormatTag::Mac => "MAC",
            FormatTag::Cocoa => "COCOA",
            FormatTag::Filetime => "FILETIME",
            FormatTag::Webkit => "WEBKIT",
            FormatTag::Chrome => "CHROME",
            FormatTag::Firefox => "FIREFOX",
        }
    }

    /// True when the output is a calendar time rather than an integer
    pub fn is_calendar(&self) -> bool {
        !matches!(
            self,
            FormatTag::UnixSecond | FormatTag::UnixMillisecond | FormatTag::UnixMicrosecond
        )
    }

    /// Zones offered alongside the fixed tags when showing timestamp details
    pub fn named_zones() -> Vec<FormatTag> {
        vec![
            FormatTag::Jst,
            FormatTag::Utc,
            FormatTag::Gmt,
            FormatTag::Zone(chrono_tz::US::Pacific),
            FormatTag::Zone(chrono_tz::US::Eastern),
            FormatTag::Zone(chrono_tz::Europe::London),
            FormatTag::Zone(chrono_tz::Europe::Paris),
            FormatTag::Zone(chrono_tz::Asia::Shanghai),
            FormatTag::Zone(chrono_tz::Asia::Seoul),
            FormatTag::Zone(chrono_tz::Australia::Sydney),
        ]
    }

    /// The full detail panel: UNIX units, platform encodings, then zones
    pub fn detail_set() -> Vec<FormatTag> {
        let mut tags = vec![
            FormatTag::UnixSecond,
            FormatTag::UnixMillisecond,
            FormatTag::UnixMicrosecond,
            FormatTag::Filetime,
            FormatTag::Mac,
            FormatTag::Cocoa,
            FormatTag::Webkit,
            FormatTag::Chrome,
            FormatTag::Firefox,
        ];
        tags.extend(Self::named_zones());
        tags
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatTag {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let tag = match trimmed.to_ascii_uppercase().as_str() {
            "JST" | "ASIA/TOKYO" => FormatTag::Jst,
            "UTC" => FormatTag::Utc,
            "GMT" => FormatTag::Gmt,
            "UNIX_SECOND" | "UNIX_SEC" => FormatTag::UnixSecond,
            "UNIX_MILLISECOND" | "UNIX_MILLI" => FormatTag::UnixMillisecond,
            "UNIX_MICROSECOND" | "UNIX" => FormatTag::UnixMicrosecond,
            "MAC" => FormatTag::Mac,
            "COCOA" => FormatTag::Cocoa,
            "FILETIME" => FormatTag::Filetime,
            "WEBKIT" => FormatTag::Webkit,
            "CHROME" => FormatTag::Chrome,
            "FIREFOX" => FormatTag::Firefox,
            _ => {
                return trimmed
                    .parse::<Tz>()
                    .map(FormatTag::Zone)
                    .map_err(|_| ConversionError::UnknownFormat(trimmed.to_string()))
            }
        };
        Ok(tag)
    }
}
