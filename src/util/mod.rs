//! Value coercion helpers shared by the feed model and writer.
//!
//! - **Formatting**: locale-invariant text for URIs, dates, integers and
//!   language tags, behind the [`ValueFormatter`] trait
//! - **Language tags**: the [`LanguageTag`] value type with canonical casing
//!
//! # Examples
//!
//! ```
//! use rsswrite::util::{Invariant, LanguageTag, ValueFormatter};
//!
//! let tag = LanguageTag::parse("en-us").unwrap();
//! assert_eq!(Invariant.language(&tag), "en-US");
//! ```

mod format;
mod language;

pub use format::{to_utc, CoercionError, Invariant, ValueFormatter, RFC1123_PATTERN};
pub use language::LanguageTag;
