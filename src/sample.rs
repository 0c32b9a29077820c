//! Demonstration feed: one weblog channel with a single post.
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use url::Url;

use crate::feed::{
    Category, Channel, ChannelElement, ChoiceGroup, FeedDocument, Guid, Image, Item,
    ItemElement, ItemSelector, Value,
};
use crate::util::LanguageTag;

pub const WEBLOG_TITLE: &str = "TheArchitect.co.uk - Jorgen Thelin's weblog";
pub const WEBLOG_URL: &str = "http://www.thearchitect.co.uk/weblog/";
pub const WEBLOG_IMAGE_URL: &str = "http://www.thearchitect.co.uk/images/jorgen-thelin.jpg";
pub const WEBLOG_IMAGE_WIDTH: u32 = 125;
pub const WEBLOG_IMAGE_HEIGHT: u32 = 100;
pub const WEBLOG_LANGUAGE: &str = "en-US";
pub const WEBLOG_RATING: &str = r#"(PICS-1.1 "http://www.rsac.org/ratingsv01.html" l by "webmaster@example.com" on "2007.01.29T10:09-0800" r (n 0 s 0 v 0 l 0))"#;

pub const ITEM_ID_TAG: &str = "tag:www.thearchitect.co.uk,2008:/weblog//2.520";
pub const ITEM_URL: &str = "http://www.thearchitect.co.uk/weblog/archives/2008/09/spore_arrives_drm_copyprotection_is_a_bug_not_a_feature.html";
pub const ITEM_TITLE: &str = "Spore Arrives";
pub const ITEM_BODY: &str = "The much anticipated Spore game is available today";
pub const ITEM_CATEGORY: &str = "Games";

fn parse_url(s: &str) -> Result<Url> {
    Url::parse(s).with_context(|| format!("Invalid sample URL: {}", s))
}

/// Builds the sample weblog document.
///
/// The item is assembled from parallel selector and value lists; the channel
/// from tagged elements.
pub fn weblog_feed() -> Result<FeedDocument> {
    let weblog_url = parse_url(WEBLOG_URL)?;

    let image = Image {
        url: parse_url(WEBLOG_IMAGE_URL)?,
        link: weblog_url.clone(),
        title: WEBLOG_TITLE.to_string(),
        width: WEBLOG_IMAGE_WIDTH,
        height: WEBLOG_IMAGE_HEIGHT,
    };

    let published = Utc
        .with_ymd_and_hms(2008, 9, 7, 20, 2, 1)
        .single()
        .context("Sample publication date is ambiguous")?;

    let item_elements = ChoiceGroup::<ItemElement>::from_parts(
        vec![
            ItemSelector::Link,
            ItemSelector::PubDate,
            ItemSelector::Guid,
            ItemSelector::Title,
            ItemSelector::Description,
            ItemSelector::Category,
        ],
        vec![
            Value::from(parse_url(ITEM_URL)?),
            Value::from(published),
            Value::from(Guid::from_uri(&parse_url(ITEM_ID_TAG)?, false)),
            Value::from(ITEM_TITLE),
            Value::from(ITEM_BODY),
            Value::from(Category::new(ITEM_CATEGORY)),
        ],
    )
    .context("Failed to build sample item")?;

    let channel_elements = ChoiceGroup::from_elements(vec![
        ChannelElement::Title(WEBLOG_TITLE.to_string()),
        ChannelElement::Link(weblog_url),
        ChannelElement::Language(LanguageTag::parse(WEBLOG_LANGUAGE)?),
        ChannelElement::Image(image),
        ChannelElement::Rating(WEBLOG_RATING.to_string()),
    ])
    .context("Failed to build sample channel")?;

    let items: Vec<Item> = vec![Item::new(item_elements)];
    tracing::debug!(items = items.len(), "Built sample feed");

    Ok(FeedDocument::new(Channel::new(channel_elements, items)))
}
