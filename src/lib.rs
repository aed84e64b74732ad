//! Run-aware placeholder substitution and text extraction for `.docx`
//! documents.
//!
//! Word splits visible text into formatting runs, and a `{key}` placeholder
//! is often broken across several of them. The engine rebuilds each
//! paragraph's logical text, finds placeholders there, and rewrites only the
//! runs they cover.
//!
//! ```no_run
//! use workdoc::{DocumentTextEngine, DocxDocument, ReplacementTable};
//!
//! # fn main() -> workdoc::Result<()> {
//! let mut doc = DocxDocument::open("letter.docx".as_ref())?;
//! let table = ReplacementTable::two("name", "Ada", "date", "2024-01-01")?;
//! let engine = DocumentTextEngine::new();
//! engine.replace(&mut doc, &table)?;
//! engine.save(&doc, Some("letter-filled.docx".as_ref()))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod docx;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod locator;
pub mod memory;
pub mod model;
pub mod progress;
pub mod rewriter;
pub mod run_index;
pub mod table;

pub use docx::{DocumentOptions, DocxDocument};
pub use engine::{DocumentTextEngine, ReplaceReport};
pub use error::{Result, WorkdocError};
pub use locator::Match;
pub use model::{DocumentModel, Paragraph, ParagraphRuns};
pub use run_index::LogicalTextView;
pub use table::{Delimiters, ReplacementTable};
