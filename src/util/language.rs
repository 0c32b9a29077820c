use std::fmt;
use std::str::FromStr;

use super::format::CoercionError;

/// A BCP 47 language tag in canonical case, such as `en-US`.
///
/// Only the syntax is checked: subtags are ASCII alphanumeric, one to eight
/// characters long, and the primary subtag is either two to eight letters or
/// one of the singletons `x` (private use, `x-whatever`) and `i`
/// (grandfathered, `i-klingon`), which must be followed by more subtags.
/// Casing follows RFC 5646: language lowercase, four-letter script
/// titlecase, two-letter region uppercase. Everything after a singleton
/// stays lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Parses and canonicalizes a language tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use rsswrite::util::LanguageTag;
    ///
    /// assert_eq!(LanguageTag::parse("EN-us").unwrap().as_str(), "en-US");
    /// assert_eq!(LanguageTag::parse("zh-hant-tw").unwrap().as_str(), "zh-Hant-TW");
    /// assert!(LanguageTag::parse("en--US").is_err());
    /// ```
    pub fn parse(tag: &str) -> Result<Self, CoercionError> {
        let invalid = || CoercionError::InvalidLanguageTag(tag.to_string());

        let mut subtags = tag.split('-').peekable();
        let primary = subtags
            .next()
            .filter(|s| is_primary_language(s) || is_leading_singleton(s))
            .ok_or_else(invalid)?;

        let mut private = is_leading_singleton(primary);
        if private && subtags.peek().is_none() {
            return Err(invalid());
        }

        let mut canonical = primary.to_ascii_lowercase();
        for subtag in subtags {
            if subtag.is_empty()
                || subtag.len() > 8
                || !subtag.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(invalid());
            }
            canonical.push('-');
            if subtag.len() == 1 {
                private = true;
            }
            let all_alpha = subtag.chars().all(|c| c.is_ascii_alphabetic());
            if private || !all_alpha {
                canonical.push_str(&subtag.to_ascii_lowercase());
            } else if subtag.len() == 2 {
                canonical.push_str(&subtag.to_ascii_uppercase());
            } else if subtag.len() == 4 {
                let (head, tail) = subtag.split_at(1);
                canonical.push_str(&head.to_ascii_uppercase());
                canonical.push_str(&tail.to_ascii_lowercase());
            } else {
                canonical.push_str(&subtag.to_ascii_lowercase());
            }
        }

        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_primary_language(subtag: &str) -> bool {
    (2..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_leading_singleton(subtag: &str) -> bool {
    subtag.eq_ignore_ascii_case("x") || subtag.eq_ignore_ascii_case("i")
}

impl FromStr for LanguageTag {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_uppercased() {
        assert_eq!(LanguageTag::parse("en-us").unwrap().as_str(), "en-US");
        assert_eq!(LanguageTag::parse("en-US").unwrap().as_str(), "en-US");
    }

    #[test]
    fn test_language_only() {
        assert_eq!(LanguageTag::parse("FR").unwrap().as_str(), "fr");
    }

    #[test]
    fn test_script_titlecased() {
        assert_eq!(
            LanguageTag::parse("ZH-HANS-cn").unwrap().as_str(),
            "zh-Hans-CN"
        );
    }

    #[test]
    fn test_numeric_region() {
        assert_eq!(LanguageTag::parse("es-419").unwrap().as_str(), "es-419");
    }

    #[test]
    fn test_private_use_lowercased() {
        assert_eq!(
            LanguageTag::parse("en-US-x-TWAIN").unwrap().as_str(),
            "en-US-x-twain"
        );
    }

    #[test]
    fn test_leading_private_use_singleton() {
        assert_eq!(LanguageTag::parse("x-whatever").unwrap().as_str(), "x-whatever");
        assert_eq!(LanguageTag::parse("X-Acme-DE").unwrap().as_str(), "x-acme-de");
    }

    #[test]
    fn test_grandfathered_irregular_tag() {
        assert_eq!(LanguageTag::parse("i-klingon").unwrap().as_str(), "i-klingon");
        assert_eq!(LanguageTag::parse("I-Default").unwrap().as_str(), "i-default");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "", "e", "x", "i-", "q-private", "en-", "-en", "en--us", "en_US", "1en",
            "en-toolongsubtag",
        ] {
            let result = LanguageTag::parse(bad);
            assert!(
                matches!(result, Err(CoercionError::InvalidLanguageTag(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_str_and_display() {
        let tag: LanguageTag = "pt-br".parse().unwrap();
        assert_eq!(tag.to_string(), "pt-BR");
    }
}
