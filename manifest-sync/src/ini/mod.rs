//! INI manifest documents.
//!
//! The game-data repository describes scenarios and content packs in INI
//! files. This module provides:
//!
//! - [`ManifestDocument`] / [`Section`]: an ordered, case-sensitive model
//! - [`parse`]: a strict parser reporting the offending line on error
//! - [`serialize`]: the inverse, producing human-diffable output
//!
//! For every valid document `parse(&serialize(&doc)) == Ok(doc)`.

mod document;
mod error;
mod parser;
mod writer;

pub use document::{ManifestDocument, Section};
pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
pub use writer::serialize;
