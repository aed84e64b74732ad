use crate::model::ParagraphRuns;

/// Where a logical byte lives in the paragraph's run structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunPos {
    pub run: usize,
    pub local: usize,
}

/// Logical text of one paragraph plus a byte-level map back onto its runs.
///
/// Derived from the paragraph at build time; any run edit invalidates it.
#[derive(Clone, Debug, Default)]
pub struct LogicalTextView {
    text: String,
    owners: Vec<RunPos>,
    run_starts: Vec<usize>,
}

impl LogicalTextView {
    pub fn build<P: ParagraphRuns + ?Sized>(paragraph: &P) -> Self {
        let count = paragraph.run_count();
        let mut text = String::new();
        let mut owners = Vec::new();
        let mut run_starts = Vec::with_capacity(count);
        for run in 0..count {
            let t = paragraph.run_text(run);
            run_starts.push(text.len());
            owners.extend((0..t.len()).map(|local| RunPos { run, local }));
            text.push_str(t);
        }
        Self {
            text,
            owners,
            run_starts,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn run_count(&self) -> usize {
        self.run_starts.len()
    }

    /// Logical offset at which a run begins; empty runs share the offset of
    /// the next run.
    pub fn run_start(&self, run: usize) -> usize {
        self.run_starts[run]
    }

    /// Run and local offset of the byte at `offset`. Empty runs never own
    /// bytes, so this lands on the next non-empty run.
    pub fn resolve_start(&self, offset: usize) -> Option<RunPos> {
        self.owners.get(offset).copied()
    }

    /// Run and exclusive local end for a logical exclusive end offset,
    /// resolved against the run owning the last byte before it.
    pub fn resolve_end(&self, offset: usize) -> Option<RunPos> {
        let last = offset.checked_sub(1)?;
        self.owners.get(last).map(|p| RunPos {
            run: p.run,
            local: p.local + 1,
        })
    }
}
