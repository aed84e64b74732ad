//! Plain in-memory document model.
//!
//! Useful for embedding callers that keep their own run structure, and as a
//! JSON interchange form (`{"paragraphs":[{"runs":[{"style":..,"text":..}]}]}`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, WorkdocError};
use crate::model::{DocumentModel, Paragraph, ParagraphRuns, ParagraphVisitor, ParagraphVisitorMut};

/// Opaque, cheaply clonable style handle. Identity is pointer identity.
#[derive(Clone)]
pub struct StyleRef(Arc<str>);

impl StyleRef {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// True when both handles point at the same style object.
    pub fn same(&self, other: &StyleRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StyleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StyleRef({:?})", &*self.0)
    }
}

impl Serialize for StyleRef {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StyleRef {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        Ok(Self(Arc::from(name)))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Run {
    pub style: StyleRef,
    pub text: String,
}

impl Run {
    pub fn new(style: &StyleRef, text: &str) -> Self {
        Self {
            style: style.clone(),
            text: text.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryParagraph {
    pub runs: Vec<Run>,
}

impl MemoryParagraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }
}

impl ParagraphRuns for MemoryParagraph {
    fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_text(&self, index: usize) -> &str {
        &self.runs[index].text
    }
}

impl Paragraph for MemoryParagraph {
    fn set_run_text(&mut self, index: usize, text: String) {
        self.runs[index].text = text;
    }

    fn remove_run(&mut self, index: usize) {
        self.runs.remove(index);
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub paragraphs: Vec<MemoryParagraph>,
    #[serde(skip)]
    location: Option<PathBuf>,
}

impl MemoryDocument {
    pub fn new(paragraphs: Vec<MemoryParagraph>) -> Self {
        Self {
            paragraphs,
            location: None,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| WorkdocError::io(path, e))?;
        let mut doc: MemoryDocument = serde_json::from_slice(&bytes)?;
        doc.location = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }
}

impl DocumentModel for MemoryDocument {
    fn visit_paragraphs(&self, visit: &mut ParagraphVisitor<'_>) -> Result<()> {
        for p in &self.paragraphs {
            visit(p)?;
        }
        Ok(())
    }

    fn visit_paragraphs_mut(&mut self, visit: &mut ParagraphVisitorMut<'_>) -> Result<()> {
        for p in &mut self.paragraphs {
            visit(p)?;
        }
        Ok(())
    }

    fn save(&self, target: Option<&Path>) -> Result<()> {
        let path = match target.or(self.location.as_deref()) {
            Some(p) => p,
            None => {
                return Err(WorkdocError::io(
                    PathBuf::new(),
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "document has no backing location",
                    ),
                ))
            }
        };
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes).map_err(|e| WorkdocError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_reopen_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let bold = StyleRef::new("bold");
        let doc = MemoryDocument::new(vec![MemoryParagraph::new(vec![
            Run::new(&bold, "Hello "),
            Run::new(&bold, "world"),
        ])]);
        doc.save(Some(path.as_path())).unwrap();

        let back = MemoryDocument::open(&path).unwrap();
        assert_eq!(back.location(), Some(path.as_path()));
        assert_eq!(back.paragraphs[0].runs[1].text, "world");
        assert_eq!(back.paragraphs[0].runs[0].style.name(), "bold");
    }

    #[test]
    fn save_without_location_fails() {
        let doc = MemoryDocument::default();
        assert!(matches!(doc.save(None), Err(WorkdocError::Io { .. })));
    }

    #[test]
    fn style_identity_is_pointer_identity() {
        let a = StyleRef::new("x");
        let b = StyleRef::new("x");
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
    }
}
