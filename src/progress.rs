use std::io::{self, Write};
use std::time::Instant;

use crate::engine::ReplaceReport;

/// Timestamped status lines on stderr for interactive runs.
pub struct ConsoleProgress {
    enabled: bool,
    t0: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            t0: Instant::now(),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.enabled {
            return;
        }
        let ts = fmt_elapsed(self.t0.elapsed().as_secs_f64());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{ts}] {}", msg.as_ref());
    }

    pub fn replace_summary(&self, report: &ReplaceReport) {
        self.info(format!(
            "replaced {} placeholder(s) in {}/{} paragraph(s)",
            report.replacements, report.paragraphs_changed, report.paragraphs_visited
        ));
        let missing: Vec<&str> = report.unmatched_keys().collect();
        if !missing.is_empty() {
            self.info(format!("not found: {}", missing.join(", ")));
        }
    }
}

fn fmt_elapsed(seconds: f64) -> String {
    let seconds = seconds.max(0.0) as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::fmt_elapsed;

    #[test]
    fn elapsed_format() {
        assert_eq!(fmt_elapsed(5.9), "00:05");
        assert_eq!(fmt_elapsed(3725.0), "01:02:05");
        assert_eq!(fmt_elapsed(-1.0), "00:00");
    }
}
