use std::fmt;
use thiserror::Error;

use super::model::Value;

/// Errors raised while building a choice group.
///
/// All of these are contract violations by the caller; a group that was
/// built successfully can never produce them later.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    /// The selector and value sequences have different lengths.
    #[error("Choice group has {selectors} selectors but {values} values")]
    ArityMismatch { selectors: usize, values: usize },

    /// A value does not have the shape its selector declares.
    #[error("Selector '{selector}' at position {index} cannot hold a {found} value")]
    TypeMismatch {
        index: usize,
        selector: &'static str,
        found: &'static str,
    },

    /// A selector that the schema allows only once occurs again.
    #[error("Selector '{selector}' repeated at position {index}")]
    DuplicateSelector { index: usize, selector: &'static str },
}

/// Identifies one element kind of a choice group.
pub trait Selector: Copy + Eq + fmt::Debug {
    /// XML element name written for this selector.
    fn tag_name(self) -> &'static str;

    /// Whether the schema allows this element more than once per group.
    fn is_repeatable(self) -> bool {
        false
    }
}

/// A tagged value belonging to one choice group vocabulary.
pub trait ChoiceElement: Sized {
    type Selector: Selector;

    fn selector(&self) -> Self::Selector;

    /// Pairs a selector with an untyped value, handing the value back when
    /// its shape does not fit.
    fn from_pair(selector: Self::Selector, value: Value) -> Result<Self, Value>;
}

/// An XSD choice group: optional child elements in caller-chosen order.
///
/// Each entry carries its own selector, so there is no second sequence that
/// could fall out of step. The order given at construction is the order the
/// writer emits; nothing sorts or deduplicates it. Groups have no mutation
/// API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceGroup<E> {
    elements: Box<[E]>,
}

impl<E: ChoiceElement> ChoiceGroup<E> {
    /// Builds a group from tagged elements.
    ///
    /// # Errors
    ///
    /// [`ChoiceError::DuplicateSelector`] when a non-repeatable element
    /// appears twice.
    pub fn from_elements<I>(elements: I) -> Result<Self, ChoiceError>
    where
        I: IntoIterator<Item = E>,
    {
        let elements: Box<[E]> = elements.into_iter().collect();
        check_repeats(elements.iter().map(|element| element.selector()))?;
        Ok(Self { elements })
    }

    /// Builds a group from parallel selector and value sequences.
    ///
    /// `selectors[i]` names the element that `values[i]` fills.
    ///
    /// # Errors
    ///
    /// - [`ChoiceError::ArityMismatch`] when the lengths differ
    /// - [`ChoiceError::TypeMismatch`] for the first value whose shape does
    ///   not fit its selector
    /// - [`ChoiceError::DuplicateSelector`] as for [`ChoiceGroup::from_elements`]
    ///
    /// # Examples
    ///
    /// ```
    /// use rsswrite::feed::{ChoiceError, ChoiceGroup, ItemElement, ItemSelector, Value};
    ///
    /// let group = ChoiceGroup::<ItemElement>::from_parts(
    ///     vec![ItemSelector::Title, ItemSelector::Description],
    ///     vec![Value::from("Spore Arrives")],
    /// );
    /// assert_eq!(
    ///     group.unwrap_err(),
    ///     ChoiceError::ArityMismatch { selectors: 2, values: 1 }
    /// );
    /// ```
    pub fn from_parts(selectors: Vec<E::Selector>, values: Vec<Value>) -> Result<Self, ChoiceError> {
        if selectors.len() != values.len() {
            return Err(ChoiceError::ArityMismatch {
                selectors: selectors.len(),
                values: values.len(),
            });
        }

        let elements = selectors
            .into_iter()
            .zip(values)
            .enumerate()
            .map(|(index, (selector, value))| {
                E::from_pair(selector, value).map_err(|value| ChoiceError::TypeMismatch {
                    index,
                    selector: selector.tag_name(),
                    found: value.kind(),
                })
            })
            .collect::<Result<Vec<E>, ChoiceError>>()?;

        Self::from_elements(elements)
    }

    /// Selector and element pairs in construction order.
    ///
    /// Call again to restart.
    pub fn pairs(&self) -> impl Iterator<Item = (E::Selector, &E)> + Clone + '_ {
        self.elements.iter().map(|element| (element.selector(), element))
    }

    pub fn selectors(&self) -> impl Iterator<Item = E::Selector> + '_ {
        self.elements.iter().map(|element| element.selector())
    }
}

impl<E> ChoiceGroup<E> {
    pub fn empty() -> Self {
        Self {
            elements: Box::default(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<E> Default for ChoiceGroup<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, E> IntoIterator for &'a ChoiceGroup<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_repeats<S: Selector>(selectors: impl Iterator<Item = S>) -> Result<(), ChoiceError> {
    // Vocabularies have at most a handful of selectors, a linear scan is enough
    let mut seen: Vec<S> = Vec::new();
    for (index, selector) in selectors.enumerate() {
        if !selector.is_repeatable() && seen.contains(&selector) {
            return Err(ChoiceError::DuplicateSelector {
                index,
                selector: selector.tag_name(),
            });
        }
        seen.push(selector);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::model::{
        Category, ChannelElement, ChannelSelector, Guid, Image, ItemElement, ItemSelector,
    };
    use chrono::{TimeZone, Utc};
    use url::Url;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn item_selectors() -> Vec<ItemSelector> {
        vec![
            ItemSelector::Link,
            ItemSelector::PubDate,
            ItemSelector::Guid,
            ItemSelector::Title,
            ItemSelector::Description,
            ItemSelector::Category,
        ]
    }

    fn item_values() -> Vec<Value> {
        vec![
            Value::from(url("http://example.com/post")),
            Value::from(Utc.with_ymd_and_hms(2008, 9, 7, 20, 2, 1).unwrap()),
            Value::from(Guid::new("tag:example.com,2008:1", false)),
            Value::from("Title"),
            Value::from("Body"),
            Value::from(Category::new("Games")),
        ]
    }

    #[test]
    fn test_from_parts_keeps_order() {
        let group = ChoiceGroup::<ItemElement>::from_parts(item_selectors(), item_values()).unwrap();

        assert_eq!(group.len(), 6);
        let selectors: Vec<_> = group.selectors().collect();
        assert_eq!(selectors, item_selectors());
    }

    #[test]
    fn test_non_canonical_order_preserved() {
        let selectors = vec![ItemSelector::Category, ItemSelector::Title, ItemSelector::Link];
        let values = vec![
            Value::from(Category::new("Games")),
            Value::from("Title"),
            Value::from(url("http://example.com/post")),
        ];

        let group = ChoiceGroup::<ItemElement>::from_parts(selectors.clone(), values).unwrap();
        let emitted: Vec<_> = group.pairs().map(|(s, _)| s).collect();
        assert_eq!(emitted, selectors);
    }

    #[test]
    fn test_pairs_is_restartable() {
        let group = ChoiceGroup::<ItemElement>::from_parts(item_selectors(), item_values()).unwrap();

        let first: Vec<_> = group.pairs().map(|(s, _)| s).collect();
        let second: Vec<_> = group.pairs().map(|(s, _)| s).collect();
        assert_eq!(first, second);

        let pairs = group.pairs();
        assert_eq!(pairs.clone().count(), pairs.count());
    }

    #[test]
    fn test_pairs_selector_matches_element() {
        let group = ChoiceGroup::<ItemElement>::from_parts(item_selectors(), item_values()).unwrap();
        for (selector, element) in group.pairs() {
            assert_eq!(selector, element.selector());
        }
    }

    #[test]
    fn test_six_selectors_five_values_is_arity_mismatch() {
        let mut values = item_values();
        values.pop();

        let err = ChoiceGroup::<ItemElement>::from_parts(item_selectors(), values).unwrap_err();
        assert_eq!(
            err,
            ChoiceError::ArityMismatch {
                selectors: 6,
                values: 5
            }
        );
    }

    #[test]
    fn test_arity_checked_before_types() {
        // Both wrong: lengths differ and the first pair is mistyped
        let err = ChoiceGroup::<ChannelElement>::from_parts(
            vec![ChannelSelector::Image, ChannelSelector::Title],
            vec![Value::from("not an image")],
        )
        .unwrap_err();
        assert!(matches!(err, ChoiceError::ArityMismatch { .. }));
    }

    #[test]
    fn test_image_selector_with_text_is_type_mismatch() {
        let err = ChoiceGroup::<ChannelElement>::from_parts(
            vec![ChannelSelector::Title, ChannelSelector::Image],
            vec![Value::from("Weblog"), Value::from("not an image")],
        )
        .unwrap_err();

        assert_eq!(
            err,
            ChoiceError::TypeMismatch {
                index: 1,
                selector: "image",
                found: "text"
            }
        );
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn test_link_selector_requires_uri() {
        let err = ChoiceGroup::<ItemElement>::from_parts(
            vec![ItemSelector::Link],
            vec![Value::from("http://example.com/post")],
        )
        .unwrap_err();
        assert!(matches!(err, ChoiceError::TypeMismatch { index: 0, .. }));
    }

    #[test]
    fn test_channel_image_accepted() {
        let image = Image {
            url: url("http://example.com/logo.png"),
            link: url("http://example.com/"),
            title: "Example".to_string(),
            width: 125,
            height: 100,
        };
        let group = ChoiceGroup::<ChannelElement>::from_parts(
            vec![ChannelSelector::Image],
            vec![Value::from(image.clone())],
        )
        .unwrap();

        assert_eq!(group.iter().next(), Some(&ChannelElement::Image(image)));
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let err = ChoiceGroup::from_elements(vec![
            ItemElement::Title("one".into()),
            ItemElement::Description("body".into()),
            ItemElement::Title("two".into()),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            ChoiceError::DuplicateSelector {
                index: 2,
                selector: "title"
            }
        );
    }

    #[test]
    fn test_repeated_category_allowed() {
        let group = ChoiceGroup::from_elements(vec![
            ItemElement::Category(Category::new("Games")),
            ItemElement::Category(Category::new("DRM")),
        ])
        .unwrap();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_empty_group() {
        let group = ChoiceGroup::<ItemElement>::from_parts(vec![], vec![]).unwrap();
        assert!(group.is_empty());
        assert_eq!(group.pairs().count(), 0);
        assert_eq!(group, ChoiceGroup::default());
    }
}
