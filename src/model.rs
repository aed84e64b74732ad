use std::path::Path;

use crate::error::Result;

/// Read access to the ordered runs of one paragraph.
pub trait ParagraphRuns {
    fn run_count(&self) -> usize;

    fn run_text(&self, index: usize) -> &str;
}

/// Mutable view over the ordered runs of one paragraph.
///
/// Implementations own the run storage; callers address runs by index and
/// never create new runs or style handles.
pub trait Paragraph: ParagraphRuns {
    /// Replace the text of a run, leaving its style untouched.
    fn set_run_text(&mut self, index: usize, text: String);

    /// Remove a run; runs after it shift down by one.
    fn remove_run(&mut self, index: usize);
}

pub type ParagraphVisitor<'v> = dyn FnMut(&dyn ParagraphRuns) -> Result<()> + 'v;
pub type ParagraphVisitorMut<'v> = dyn FnMut(&mut dyn Paragraph) -> Result<()> + 'v;

/// A document whose paragraphs can be walked in document order and persisted.
pub trait DocumentModel {
    fn visit_paragraphs(&self, visit: &mut ParagraphVisitor<'_>) -> Result<()>;

    fn visit_paragraphs_mut(&mut self, visit: &mut ParagraphVisitorMut<'_>) -> Result<()>;

    /// Persist the document. `None` overwrites the backing location.
    fn save(&self, target: Option<&Path>) -> Result<()>;
}
