//! RSS 2.0 document model and writer.
//!
//! - [`choice`] - ordered choice groups, the schema's "any subset, in this
//!   order" construct for channel and item children
//! - [`model`] - the document graph: channel, items and their value objects
//! - [`writer`] - quick-xml based serializer
//!
//! # Example
//!
//! ```
//! use rsswrite::feed::{
//!     Channel, ChannelElement, ChoiceGroup, FeedDocument, Item, ItemElement, RssWriter,
//!     WriterOptions,
//! };
//!
//! let item = Item::from_elements(vec![ItemElement::Title("Spore Arrives".into())]).unwrap();
//! let channel = ChoiceGroup::from_elements(vec![ChannelElement::Title("Weblog".into())]).unwrap();
//! let document = FeedDocument::new(Channel::new(channel, vec![item]));
//!
//! let xml = RssWriter::new(WriterOptions::default()).emit(&document).unwrap();
//! assert!(xml.contains("<title>Spore Arrives</title>"));
//! ```

mod choice;
mod model;
mod writer;

pub use choice::{ChoiceElement, ChoiceError, ChoiceGroup, Selector};
pub use model::{
    Category, Channel, ChannelElement, ChannelSelector, FeedDocument, Guid, Image, Item,
    ItemElement, ItemSelector, Value,
};
pub use writer::{
    RssWriter, SerializationError, WriterOptions, RSS_VERSION, XSD_NAMESPACE, XSI_NAMESPACE,
};
