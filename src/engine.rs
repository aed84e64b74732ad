use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::locator::TokenLocator;
use crate::model::DocumentModel;
use crate::rewriter;
use crate::run_index::LogicalTextView;
use crate::table::ReplacementTable;

pub const DEFAULT_PARAGRAPH_SEPARATOR: &str = "\n";

/// Summary of one replace call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    pub paragraphs_visited: usize,
    pub paragraphs_changed: usize,
    pub replacements: usize,
    pub runs_removed: usize,
    /// Occurrences per key. Zero means the key was not found.
    pub hits: BTreeMap<String, usize>,
}

impl ReplaceReport {
    pub fn unmatched_keys(&self) -> impl Iterator<Item = &str> {
        self.hits
            .iter()
            .filter(|(_, n)| **n == 0)
            .map(|(k, _)| k.as_str())
    }
}

/// Reads text from and substitutes placeholders into a [`DocumentModel`].
#[derive(Clone, Debug)]
pub struct DocumentTextEngine {
    paragraph_separator: String,
}

impl Default for DocumentTextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTextEngine {
    pub fn new() -> Self {
        Self {
            paragraph_separator: DEFAULT_PARAGRAPH_SEPARATOR.to_string(),
        }
    }

    pub fn with_paragraph_separator(mut self, separator: impl Into<String>) -> Self {
        self.paragraph_separator = separator.into();
        self
    }

    pub fn paragraph_texts(&self, document: &dyn DocumentModel) -> Result<Vec<String>> {
        let mut out = Vec::new();
        document.visit_paragraphs(&mut |p| {
            out.push(LogicalTextView::build(p).text().to_string());
            Ok(())
        })?;
        Ok(out)
    }

    pub fn read_text(&self, document: &dyn DocumentModel) -> Result<String> {
        Ok(self.paragraph_texts(document)?.join(&self.paragraph_separator))
    }

    pub fn replace(
        &self,
        document: &mut dyn DocumentModel,
        table: &ReplacementTable,
    ) -> Result<ReplaceReport> {
        let mut report = ReplaceReport {
            hits: table.iter().map(|(k, _)| (k.to_string(), 0)).collect(),
            ..Default::default()
        };
        if table.is_empty() {
            return Ok(report);
        }

        let locator = TokenLocator::new(table);
        document.visit_paragraphs_mut(&mut |p| {
            report.paragraphs_visited += 1;
            let view = LogicalTextView::build(&*p);
            let matches = locator.locate(view.text());
            if matches.is_empty() {
                return Ok(());
            }
            tracing::trace!(
                paragraph = report.paragraphs_visited - 1,
                matches = matches.len(),
                "rewriting paragraph"
            );
            for m in &matches {
                if let Some(n) = report.hits.get_mut(&m.key) {
                    *n += 1;
                }
            }
            let stats = rewriter::apply(p, &view, &matches);
            report.paragraphs_changed += 1;
            report.replacements += stats.replaced;
            report.runs_removed += stats.runs_removed;
            Ok(())
        })?;

        for key in report.unmatched_keys() {
            tracing::debug!(key, "placeholder not found in document");
        }
        tracing::debug!(
            paragraphs = report.paragraphs_visited,
            changed = report.paragraphs_changed,
            replacements = report.replacements,
            "replace finished"
        );
        Ok(report)
    }

    pub fn save(&self, document: &dyn DocumentModel, target: Option<&Path>) -> Result<()> {
        document.save(target)
    }
}
