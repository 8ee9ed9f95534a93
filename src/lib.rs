//! # doxmark
//!
//! Classifies runs of text inside source-code comments according to
//! Doxygen/Javadoc command syntax and a small markdown dialect (bold,
//! italic, strikethrough, inline code), producing an ordered set of
//! non-overlapping labeled ranges for syntax highlighting or tooltips.
//!
//! The caller supplies text already known to be comment content; deciding
//! what is a comment, and mapping classifications to visual styles, happen
//! outside this crate.
//!
//! ```text
//! let parser = CommentParser::with_defaults()?;
//! for group in parser.parse("/// @param[in] count number of items") {
//!     for fragment in group.fragments() {
//!         // fragment.start(), fragment.len(), fragment.classification()
//!     }
//! }
//! ```
//!
//! Command-to-classification assignments are customizable: a
//! [`registry::config::CommandConfig`] rebuilds the registry, and
//! [`registry::lookup::SharedRegistry`] publishes the new snapshot
//! atomically to concurrent readers.

pub mod fragments;
pub mod markup;
pub mod matchers;
pub mod parser;
pub mod patterns;
pub mod registry;

pub use fragments::{Classification, Fragment, FragmentGroup};
pub use parser::CommentParser;
pub use registry::config::{CommandConfig, CommandOverride, ConfigError, CONFIG_VERSION};
pub use registry::lookup::{SharedRegistry, TokenClassificationCache};
pub use registry::Registry;
