//! Emit RSS 2.0 documents from schema-shaped choice groups.
//!
//! RSS 2.0's schema declares `channel` and `item` children as XSD choice
//! groups: any subset of a fixed vocabulary, in the order the producer picks.
//! This crate models each group as one ordered sequence of tagged elements
//! and writes them out in exactly that order, formatting dates, numbers and
//! URIs without reference to the process locale.
//!
//! - [`feed`]: choice groups, the document model and the writer
//! - [`util`]: locale-invariant value formatting and language tags
//! - [`config`]: optional TOML output settings
//! - [`sample`]: the demonstration weblog feed

pub mod config;
pub mod feed;
pub mod sample;
pub mod util;
