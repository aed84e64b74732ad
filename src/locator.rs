use std::collections::HashMap;

use regex::Regex;

use crate::table::ReplacementTable;

/// A resolved placeholder occurrence in a paragraph's logical text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub key: String,
    pub replacement: String,
}

/// Compiled form of a replacement table, reusable across paragraphs.
pub struct TokenLocator<'t> {
    pattern: Option<Regex>,
    by_token: HashMap<String, (&'t str, &'t str)>,
}

impl<'t> TokenLocator<'t> {
    pub fn new(table: &'t ReplacementTable) -> Self {
        let mut tokens: Vec<(String, &'t str, &'t str)> = table
            .placeholders()
            .zip(table.iter())
            .map(|(ph, (k, v))| (ph.render(), k, v))
            .collect();
        // Alternation is leftmost-first: longer tokens must come first so a
        // key that prefixes another key's token cannot shadow it.
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        let pattern = if tokens.is_empty() {
            None
        } else {
            let alternation = tokens
                .iter()
                .map(|(t, _, _)| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            // Escaped literals always compile; only the size limit can fail.
            match Regex::new(&alternation) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("placeholder pattern rejected, falling back to literal scan: {e}");
                    None
                }
            }
        };

        let by_token = tokens.into_iter().map(|(t, k, v)| (t, (k, v))).collect();
        Self { pattern, by_token }
    }

    /// Find every non-overlapping placeholder occurrence, left to right.
    pub fn locate(&self, text: &str) -> Vec<Match> {
        match &self.pattern {
            Some(re) => re
                .find_iter(text)
                .filter_map(|m| {
                    let (key, value) = self.by_token.get(m.as_str())?;
                    Some(Match {
                        start: m.start(),
                        end: m.end(),
                        key: key.to_string(),
                        replacement: value.to_string(),
                    })
                })
                .collect(),
            None => self.locate_literal(text),
        }
    }

    fn locate_literal(&self, text: &str) -> Vec<Match> {
        let mut tokens: Vec<(&String, &(&str, &str))> = self.by_token.iter().collect();
        tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut out = Vec::new();
        let mut pos = 0usize;
        while pos < text.len() {
            let rest = &text[pos..];
            let hit = tokens.iter().find(|(t, _)| rest.starts_with(t.as_str()));
            match hit {
                Some((token, (key, value))) => {
                    out.push(Match {
                        start: pos,
                        end: pos + token.len(),
                        key: key.to_string(),
                        replacement: value.to_string(),
                    });
                    pos += token.len();
                }
                None => {
                    pos += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        out
    }
}

pub fn locate(text: &str, table: &ReplacementTable) -> Vec<Match> {
    TokenLocator::new(table).locate(text)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::table::Delimiters;

    fn spans(ms: &[Match]) -> Vec<(usize, usize, &str)> {
        ms.iter().map(|m| (m.start, m.end, m.key.as_str())).collect()
    }

    #[test]
    fn longest_token_wins_at_same_position() {
        let t = ReplacementTable::two("a", "A", "ab", "AB").unwrap();
        let ms = locate("{ab}{a}", &t);
        assert_eq!(spans(&ms), vec![(0, 4, "ab"), (4, 7, "a")]);
        assert_eq!(ms[0].replacement, "AB");
    }

    #[test]
    fn longest_wins_when_key_is_a_prefix_of_another_token() {
        let t = ReplacementTable::two("x", "1", "x}y", "2")
            .unwrap()
            .with_delimiters(Delimiters::new("{", "}").unwrap());
        assert_eq!(spans(&locate("{x}y}", &t)), vec![(0, 5, "x}y")]);
    }

    #[test]
    fn matches_do_not_overlap() {
        let t = ReplacementTable::two("a}{b", "X", "b", "Y").unwrap();
        assert_eq!(spans(&locate("{a}{b}", &t)), vec![(0, 6, "a}{b")]);
    }

    #[test]
    fn unknown_keys_and_plain_text_yield_nothing() {
        let t = ReplacementTable::one("missing", "v").unwrap();
        assert!(locate("no placeholders {here}", &t).is_empty());
        assert!(locate("", &t).is_empty());
        assert!(locate("{x}", &ReplacementTable::default()).is_empty());
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let t = ReplacementTable::one("a.b", "v")
            .unwrap()
            .with_delimiters(Delimiters::new("$(", ")").unwrap());
        assert_eq!(spans(&locate("$(axb) $(a.b)", &t)), vec![(7, 13, "a.b")]);
    }

    #[test]
    fn literal_scan_agrees_with_regex_scan() {
        let t = ReplacementTable::three("a", "1", "ab", "2", "é", "3").unwrap();
        let loc = TokenLocator::new(&t);
        let text = "x{ab}{a}é{é}{a";
        assert_eq!(loc.locate(text), loc.locate_literal(text));
    }
}
