use chrono::{DateTime, Datelike, TimeZone, Utc};
use thiserror::Error;
use url::Url;

use super::language::LanguageTag;

/// Errors raised when a value falls outside what its textual form can express.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// RFC 1123 dates carry exactly four year digits.
    #[error("Year {0} cannot be written as an RFC 1123 date")]
    YearOutOfRange(i32),

    /// The string is not a well-formed BCP 47 language tag.
    #[error("Invalid language tag: {0:?}")]
    InvalidLanguageTag(String),
}

/// `strftime` pattern for RFC 1123 dates as used by RSS `pubDate`.
///
/// chrono renders `%a` and `%b` with English names only, so the output does
/// not depend on the process locale.
pub const RFC1123_PATTERN: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Turns typed feed values into the exact text written into the document.
///
/// The serializer takes a formatter explicitly instead of consulting any
/// ambient locale. [`Invariant`] is the formatter RSS requires.
pub trait ValueFormatter {
    /// Absolute form of a URI.
    fn uri(&self, uri: &Url) -> String;

    /// RFC 1123 rendering of a UTC instant.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::YearOutOfRange`] for years that do not fit
    /// in four digits.
    fn date_time(&self, instant: &DateTime<Utc>) -> Result<String, CoercionError>;

    /// Plain decimal digits, no sign and no grouping.
    fn integer(&self, value: u32) -> String;

    /// Canonical spelling of a language tag.
    fn language(&self, tag: &LanguageTag) -> String;
}

/// Locale-invariant formatting.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use rsswrite::util::{Invariant, ValueFormatter};
///
/// let published = Utc.with_ymd_and_hms(2008, 9, 7, 20, 2, 1).unwrap();
/// assert_eq!(
///     Invariant.date_time(&published).unwrap(),
///     "Sun, 07 Sep 2008 20:02:01 GMT"
/// );
/// assert_eq!(Invariant.integer(125), "125");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invariant;

impl ValueFormatter for Invariant {
    fn uri(&self, uri: &Url) -> String {
        uri.as_str().to_string()
    }

    fn date_time(&self, instant: &DateTime<Utc>) -> Result<String, CoercionError> {
        let year = instant.year();
        if !(0..=9999).contains(&year) {
            return Err(CoercionError::YearOutOfRange(year));
        }
        Ok(instant.format(RFC1123_PATTERN).to_string())
    }

    fn integer(&self, value: u32) -> String {
        value.to_string()
    }

    fn language(&self, tag: &LanguageTag) -> String {
        tag.as_str().to_string()
    }
}

/// Normalizes an instant from any time zone to UTC.
///
/// Dates must pass through here before formatting; the formatter itself only
/// accepts UTC.
pub fn to_utc<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<Utc> {
    instant.with_timezone(&Utc)
}
