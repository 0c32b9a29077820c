use anyhow::{Context, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

use super::choice::Selector;
use super::model::{ChannelElement, FeedDocument, Guid, Image, ItemElement};
use crate::util::{CoercionError, Invariant, ValueFormatter};

pub const RSS_VERSION: &str = "2.0";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Errors that can occur while emitting a document.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// A value could not be formatted; `field` names where it sits.
    #[error("Failed to format {field}: {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    /// Text holds a character outside the XML 1.0 `Char` production.
    #[error("Character {ch:?} in {field} cannot appear in XML")]
    InvalidCharacter { field: String, ch: char },

    /// The underlying XML writer failed.
    #[error("Failed to write {field}: {message}")]
    Xml { field: String, message: String },

    /// An element was closed out of stack order.
    #[error("Unbalanced element: expected </{expected}>, found </{found}>")]
    Unbalanced { expected: String, found: String },
}

/// Layout of the emitted text. Content is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Whether to start with `<?xml version="1.0" encoding="UTF-8"?>`.
    pub xml_declaration: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            xml_declaration: true,
        }
    }
}

/// Elements that hold children and therefore live on the open-element stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Rss,
    Channel,
    Image,
    Item,
}

impl Container {
    fn tag(self) -> &'static str {
        match self {
            Container::Rss => "rss",
            Container::Channel => "channel",
            Container::Image => "image",
            Container::Item => "item",
        }
    }
}

/// Where the tree walk currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InRss,
    InChannel,
    InImage,
    InItem,
}

/// quick-xml writer plus the stack of open containers.
///
/// Leaf elements are written in one step and never pushed.
struct Emitter {
    writer: Writer<Cursor<Vec<u8>>>,
    open: Vec<Container>,
}

impl Emitter {
    fn new(options: &WriterOptions) -> Self {
        let buffer = Cursor::new(Vec::new());
        let writer = if options.indent > 0 {
            Writer::new_with_indent(buffer, b' ', options.indent)
        } else {
            Writer::new(buffer)
        };
        Self {
            writer,
            open: Vec::new(),
        }
    }

    fn state(&self) -> State {
        match self.open.last() {
            None => State::Idle,
            Some(Container::Rss) => State::InRss,
            Some(Container::Channel) => State::InChannel,
            Some(Container::Image) => State::InImage,
            Some(Container::Item) => State::InItem,
        }
    }

    fn write(&mut self, event: Event<'_>, field: &str) -> Result<(), SerializationError> {
        self.writer
            .write_event(event)
            .map_err(|e| SerializationError::Xml {
                field: field.to_string(),
                message: e.to_string(),
            })
    }

    fn declaration(&mut self) -> Result<(), SerializationError> {
        self.write(
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
            "XML declaration",
        )
    }

    fn open(&mut self, container: Container, start: BytesStart<'_>) -> Result<(), SerializationError> {
        self.write(Event::Start(start), container.tag())?;
        self.open.push(container);
        Ok(())
    }

    fn close(&mut self, container: Container) -> Result<(), SerializationError> {
        match self.open.pop() {
            Some(top) if top == container => {
                self.write(Event::End(BytesEnd::new(container.tag())), container.tag())
            }
            top => Err(SerializationError::Unbalanced {
                expected: top.map(Container::tag).unwrap_or("nothing").to_string(),
                found: container.tag().to_string(),
            }),
        }
    }

    /// Writes `<name attrs>text</name>`, escaping only `<`, `>` and `&`.
    fn leaf(&mut self, start: BytesStart<'_>, text: &str, field: &str) -> Result<(), SerializationError> {
        check_xml_chars(text, field)?;
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        self.write(Event::Start(start), field)?;
        self.write(Event::Text(BytesText::from_escaped(partial_escape(text))), field)?;
        self.write(Event::End(BytesEnd::new(name)), field)
    }

    fn text_element(&mut self, name: &str, text: &str, field: &str) -> Result<(), SerializationError> {
        self.leaf(BytesStart::new(name), text, field)
    }

    fn finish(self) -> Result<String, SerializationError> {
        if let Some(top) = self.open.last() {
            return Err(SerializationError::Unbalanced {
                expected: top.tag().to_string(),
                found: "end of document".to_string(),
            });
        }
        let bytes = self.writer.into_inner().into_inner();
        String::from_utf8(bytes).map_err(|e| SerializationError::Xml {
            field: "document".to_string(),
            message: e.to_string(),
        })
    }
}

/// Emits RSS 2.0 documents.
///
/// The whole document is rendered into memory first, so a failure never
/// leaves partial output behind.
///
/// # Examples
///
/// ```
/// use rsswrite::feed::{
///     Channel, ChannelElement, ChoiceGroup, FeedDocument, RssWriter, WriterOptions,
/// };
///
/// let elements = ChoiceGroup::from_elements(vec![ChannelElement::Title("Weblog".into())]).unwrap();
/// let document = FeedDocument::new(Channel::new(elements, vec![]));
///
/// let writer = RssWriter::new(WriterOptions { indent: 0, xml_declaration: false });
/// let xml = writer.emit(&document).unwrap();
/// assert!(xml.contains("<channel><title>Weblog</title></channel>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RssWriter<F = Invariant> {
    options: WriterOptions,
    formatter: F,
}

impl RssWriter<Invariant> {
    pub fn new(options: WriterOptions) -> Self {
        Self::with_formatter(options, Invariant)
    }
}

impl<F: ValueFormatter> RssWriter<F> {
    pub fn with_formatter(options: WriterOptions, formatter: F) -> Self {
        Self { options, formatter }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Renders the document as XML text.
    ///
    /// Channel and item children come out in their choice groups' pair
    /// order, items in insertion order.
    ///
    /// # Errors
    ///
    /// [`SerializationError::Coercion`] when a value cannot be formatted and
    /// [`SerializationError::InvalidCharacter`] when text holds a character
    /// XML cannot carry, both naming the offending field (e.g.
    /// `item[0].pubDate`).
    pub fn emit(&self, document: &FeedDocument) -> Result<String, SerializationError> {
        let mut emitter = Emitter::new(&self.options);
        debug_assert_eq!(emitter.state(), State::Idle);

        if self.options.xml_declaration {
            emitter.declaration()?;
        }

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
        rss.push_attribute(("xmlns:xsd", XSD_NAMESPACE));
        rss.push_attribute(("version", RSS_VERSION));
        emitter.open(Container::Rss, rss)?;

        let channel = document.channel();
        emitter.open(Container::Channel, BytesStart::new("channel"))?;
        for (selector, element) in channel.elements().pairs() {
            let field = format!("channel.{}", selector.tag_name());
            self.channel_element(&mut emitter, element, &field)?;
        }

        for (index, item) in channel.items().iter().enumerate() {
            emitter.open(Container::Item, BytesStart::new("item"))?;
            for (selector, element) in item.elements().pairs() {
                let field = format!("item[{}].{}", index, selector.tag_name());
                self.item_element(&mut emitter, element, &field)?;
            }
            emitter.close(Container::Item)?;
        }

        emitter.close(Container::Channel)?;
        emitter.close(Container::Rss)?;

        tracing::debug!(
            channel_elements = channel.elements().len(),
            items = channel.items().len(),
            "Emitted RSS document"
        );
        emitter.finish()
    }

    /// Renders the document and writes it to `path` atomically.
    ///
    /// Nothing touches the file system when rendering fails, and the
    /// destination never holds a partial document.
    pub fn emit_to_file(&self, document: &FeedDocument, path: &Path) -> Result<()> {
        let content = self
            .emit(document)
            .with_context(|| format!("Failed to render feed for '{}'", path.display()))?;

        replace_file(path, content.as_bytes())
            .with_context(|| format!("Failed to write feed to '{}'", path.display()))?;

        tracing::info!(path = %path.display(), bytes = content.len(), "Wrote RSS document");
        Ok(())
    }

    fn channel_element(
        &self,
        emitter: &mut Emitter,
        element: &ChannelElement,
        field: &str,
    ) -> Result<(), SerializationError> {
        debug_assert_eq!(emitter.state(), State::InChannel);
        match element {
            ChannelElement::Title(title) => emitter.text_element("title", title, field),
            ChannelElement::Link(uri) => {
                emitter.text_element("link", &self.formatter.uri(uri), field)
            }
            ChannelElement::Language(tag) => {
                emitter.text_element("language", &self.formatter.language(tag), field)
            }
            ChannelElement::Image(image) => self.image(emitter, image, field),
            ChannelElement::Rating(rating) => emitter.text_element("rating", rating, field),
        }
    }

    /// `<image>` children follow the schema's fixed sequence.
    fn image(&self, emitter: &mut Emitter, image: &Image, field: &str) -> Result<(), SerializationError> {
        emitter.open(Container::Image, BytesStart::new("image"))?;
        debug_assert_eq!(emitter.state(), State::InImage);

        emitter.text_element("url", &self.formatter.uri(&image.url), &format!("{}.url", field))?;
        emitter.text_element("link", &self.formatter.uri(&image.link), &format!("{}.link", field))?;
        emitter.text_element(
            "width",
            &self.formatter.integer(image.width),
            &format!("{}.width", field),
        )?;
        emitter.text_element(
            "height",
            &self.formatter.integer(image.height),
            &format!("{}.height", field),
        )?;
        emitter.text_element("title", &image.title, &format!("{}.title", field))?;

        emitter.close(Container::Image)
    }

    fn item_element(
        &self,
        emitter: &mut Emitter,
        element: &ItemElement,
        field: &str,
    ) -> Result<(), SerializationError> {
        debug_assert_eq!(emitter.state(), State::InItem);
        match element {
            ItemElement::Link(uri) => emitter.text_element("link", &self.formatter.uri(uri), field),
            ItemElement::PubDate(instant) => {
                let text = self
                    .formatter
                    .date_time(instant)
                    .map_err(|source| SerializationError::Coercion {
                        field: field.to_string(),
                        source,
                    })?;
                emitter.text_element("pubDate", &text, field)
            }
            ItemElement::Guid(guid) => guid_element(emitter, guid, field),
            ItemElement::Title(title) => emitter.text_element("title", title, field),
            ItemElement::Description(body) => emitter.text_element("description", body, field),
            ItemElement::Category(category) => {
                emitter.text_element("category", &category.name, field)
            }
        }
    }
}

/// XML 1.0 `Char`: tab, newline, carriage return, and the Unicode ranges
/// minus surrogates (which `char` excludes) and U+FFFE/U+FFFF.
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_xml_chars(text: &str, field: &str) -> Result<(), SerializationError> {
    match text.chars().find(|&ch| !is_xml_char(ch)) {
        Some(ch) => Err(SerializationError::InvalidCharacter {
            field: field.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `feed.xml` becomes `.feed.xml.<pid>.<n>.tmp` in the same directory, so the
/// final rename never crosses file systems.
fn sibling_temp_path(path: &Path) -> PathBuf {
    let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| OsStr::new("feed")));
    name.push(format!(".{}.{}.tmp", std::process::id(), sequence));
    path.with_file_name(name)
}

/// Writes `content` to a sibling temp file, syncs it, and renames it over
/// `path`. The temp file is removed on any failure after it was created.
fn replace_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = sibling_temp_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)?;

    let synced = (|| {
        file.write_all(content)?;
        file.sync_all()
    })();
    drop(file);
    let written = synced.and_then(|()| fs::rename(&temp_path, path));

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn guid_element(emitter: &mut Emitter, guid: &Guid, field: &str) -> Result<(), SerializationError> {
    let mut start = BytesStart::new("guid");
    start.push_attribute(("isPermaLink", if guid.is_perma_link { "true" } else { "false" }));
    emitter.leaf(start, &guid.value, field)
}
