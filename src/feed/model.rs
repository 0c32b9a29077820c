use chrono::{DateTime, Utc};
use url::Url;

use super::choice::{ChoiceElement, ChoiceError, ChoiceGroup, Selector};
use crate::util::{Invariant, LanguageTag, ValueFormatter};

// ============================================================================
// Value Objects
// ============================================================================

/// Channel logo, written as the nested `<image>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Location of the GIF, JPEG or PNG.
    pub url: Url,
    /// Where the image links to, normally the channel's site.
    pub link: Url,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Item identifier written as `<guid isPermaLink="...">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guid {
    pub value: String,
    /// True when `value` is a URL a reader can open.
    pub is_perma_link: bool,
}

impl Guid {
    pub fn new(value: impl Into<String>, is_perma_link: bool) -> Self {
        Self {
            value: value.into(),
            is_perma_link,
        }
    }

    /// Uses the absolute form of a URI, e.g. a `tag:` URI, as the identifier.
    pub fn from_uri(uri: &Url, is_perma_link: bool) -> Self {
        Self::new(Invariant.uri(uri), is_perma_link)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Untyped value accepted by [`ChoiceGroup::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Uri(Url),
    Timestamp(DateTime<Utc>),
    Language(LanguageTag),
    Image(Image),
    Guid(Guid),
    Category(Category),
}

impl Value {
    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Uri(_) => "uri",
            Value::Timestamp(_) => "timestamp",
            Value::Language(_) => "language",
            Value::Image(_) => "image",
            Value::Guid(_) => "guid",
            Value::Category(_) => "category",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Url> for Value {
    fn from(uri: Url) -> Self {
        Value::Uri(uri)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(instant: DateTime<Utc>) -> Self {
        Value::Timestamp(instant)
    }
}

impl From<LanguageTag> for Value {
    fn from(tag: LanguageTag) -> Self {
        Value::Language(tag)
    }
}

impl From<Image> for Value {
    fn from(image: Image) -> Self {
        Value::Image(image)
    }
}

impl From<Guid> for Value {
    fn from(guid: Guid) -> Self {
        Value::Guid(guid)
    }
}

impl From<Category> for Value {
    fn from(category: Category) -> Self {
        Value::Category(category)
    }
}

// ============================================================================
// Channel Vocabulary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSelector {
    Title,
    Link,
    Language,
    Image,
    Rating,
}

impl Selector for ChannelSelector {
    fn tag_name(self) -> &'static str {
        match self {
            ChannelSelector::Title => "title",
            ChannelSelector::Link => "link",
            ChannelSelector::Language => "language",
            ChannelSelector::Image => "image",
            ChannelSelector::Rating => "rating",
        }
    }
}

/// Optional child of `<channel>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelElement {
    Title(String),
    Link(Url),
    Language(LanguageTag),
    Image(Image),
    /// PICS rating label.
    Rating(String),
}

impl ChoiceElement for ChannelElement {
    type Selector = ChannelSelector;

    fn selector(&self) -> ChannelSelector {
        match self {
            ChannelElement::Title(_) => ChannelSelector::Title,
            ChannelElement::Link(_) => ChannelSelector::Link,
            ChannelElement::Language(_) => ChannelSelector::Language,
            ChannelElement::Image(_) => ChannelSelector::Image,
            ChannelElement::Rating(_) => ChannelSelector::Rating,
        }
    }

    fn from_pair(selector: ChannelSelector, value: Value) -> Result<Self, Value> {
        match (selector, value) {
            (ChannelSelector::Title, Value::Text(s)) => Ok(ChannelElement::Title(s)),
            (ChannelSelector::Link, Value::Uri(u)) => Ok(ChannelElement::Link(u)),
            (ChannelSelector::Language, Value::Language(t)) => Ok(ChannelElement::Language(t)),
            (ChannelSelector::Image, Value::Image(i)) => Ok(ChannelElement::Image(i)),
            (ChannelSelector::Rating, Value::Text(s)) => Ok(ChannelElement::Rating(s)),
            (_, value) => Err(value),
        }
    }
}

// ============================================================================
// Item Vocabulary
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemSelector {
    Link,
    PubDate,
    Guid,
    Title,
    Description,
    Category,
}

impl Selector for ItemSelector {
    fn tag_name(self) -> &'static str {
        match self {
            ItemSelector::Link => "link",
            ItemSelector::PubDate => "pubDate",
            ItemSelector::Guid => "guid",
            ItemSelector::Title => "title",
            ItemSelector::Description => "description",
            ItemSelector::Category => "category",
        }
    }

    fn is_repeatable(self) -> bool {
        matches!(self, ItemSelector::Category)
    }
}

/// Optional child of `<item>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemElement {
    Link(Url),
    PubDate(DateTime<Utc>),
    Guid(Guid),
    Title(String),
    Description(String),
    Category(Category),
}

impl ChoiceElement for ItemElement {
    type Selector = ItemSelector;

    fn selector(&self) -> ItemSelector {
        match self {
            ItemElement::Link(_) => ItemSelector::Link,
            ItemElement::PubDate(_) => ItemSelector::PubDate,
            ItemElement::Guid(_) => ItemSelector::Guid,
            ItemElement::Title(_) => ItemSelector::Title,
            ItemElement::Description(_) => ItemSelector::Description,
            ItemElement::Category(_) => ItemSelector::Category,
        }
    }

    fn from_pair(selector: ItemSelector, value: Value) -> Result<Self, Value> {
        match (selector, value) {
            (ItemSelector::Link, Value::Uri(u)) => Ok(ItemElement::Link(u)),
            (ItemSelector::PubDate, Value::Timestamp(t)) => Ok(ItemElement::PubDate(t)),
            (ItemSelector::Guid, Value::Guid(g)) => Ok(ItemElement::Guid(g)),
            (ItemSelector::Title, Value::Text(s)) => Ok(ItemElement::Title(s)),
            (ItemSelector::Description, Value::Text(s)) => Ok(ItemElement::Description(s)),
            (ItemSelector::Category, Value::Category(c)) => Ok(ItemElement::Category(c)),
            (_, value) => Err(value),
        }
    }
}

// ============================================================================
// Document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    elements: ChoiceGroup<ItemElement>,
}

impl Item {
    pub fn new(elements: ChoiceGroup<ItemElement>) -> Self {
        Self { elements }
    }

    pub fn from_elements<I>(elements: I) -> Result<Self, ChoiceError>
    where
        I: IntoIterator<Item = ItemElement>,
    {
        Ok(Self::new(ChoiceGroup::from_elements(elements)?))
    }

    pub fn elements(&self) -> &ChoiceGroup<ItemElement> {
        &self.elements
    }
}

/// `<channel>` contents: its own choice group followed by the items.
///
/// Items keep insertion order; readers treat it as publication order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    elements: ChoiceGroup<ChannelElement>,
    items: Vec<Item>,
}

impl Channel {
    pub fn new(elements: ChoiceGroup<ChannelElement>, items: Vec<Item>) -> Self {
        Self { elements, items }
    }

    pub fn elements(&self) -> &ChoiceGroup<ChannelElement> {
        &self.elements
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

/// Root of an RSS 2.0 document. Built once, then handed to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDocument {
    channel: Channel,
}

impl FeedDocument {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}
