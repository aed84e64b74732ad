use crate::locator::Match;
use crate::model::Paragraph;
use crate::run_index::LogicalTextView;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub replaced: usize,
    pub runs_removed: usize,
}

/// Rewrite the runs covered by `matches`.
///
/// `matches` must be sorted by start and non-overlapping, with offsets taken
/// from `view`, which must have been built from `paragraph` as it is now.
/// A match inside one run is spliced in place. A match spanning several runs
/// is collapsed into the first of them, which keeps its style; the other
/// spanned runs are removed.
pub fn apply(
    paragraph: &mut dyn Paragraph,
    view: &LogicalTextView,
    matches: &[Match],
) -> RewriteStats {
    let mut stats = RewriteStats::default();

    // Back to front: splices only shift bytes after the edit point, and run
    // removals only shift runs after the first spanned run.
    for m in matches.iter().rev() {
        let (Some(first), Some(last)) = (view.resolve_start(m.start), view.resolve_end(m.end)) else {
            tracing::warn!(start = m.start, end = m.end, "match outside paragraph text, skipped");
            continue;
        };

        if first.run == last.run {
            let current = paragraph.run_text(first.run);
            let kept = current.len() - (last.local - first.local);
            let mut text = String::with_capacity(kept + m.replacement.len());
            text.push_str(&current[..first.local]);
            text.push_str(&m.replacement);
            text.push_str(&current[last.local..]);
            paragraph.set_run_text(first.run, text);
        } else {
            let head = &paragraph.run_text(first.run)[..first.local];
            let tail = &paragraph.run_text(last.run)[last.local..];
            let text = format!("{head}{}{tail}", m.replacement);
            paragraph.set_run_text(first.run, text);
            for run in (first.run + 1..=last.run).rev() {
                paragraph.remove_run(run);
            }
            stats.runs_removed += last.run - first.run;
        }
        stats.replaced += 1;
    }

    stats
}
