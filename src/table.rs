use crate::error::{Result, WorkdocError};

/// The fixed token pair that bounds a placeholder key in document text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delimiters {
    pub start: String,
    pub end: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            start: "{".to_string(),
            end: "}".to_string(),
        }
    }
}

impl Delimiters {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Result<Self> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() || end.is_empty() {
            return Err(WorkdocError::invalid("placeholder delimiters must be non-empty"));
        }
        Ok(Self { start, end })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub key: &'a str,
    pub delimiters: &'a Delimiters,
}

impl Placeholder<'_> {
    /// Literal token as it appears in document text, e.g. `{name}`.
    pub fn render(&self) -> String {
        let d = self.delimiters;
        let mut s = String::with_capacity(d.start.len() + self.key.len() + d.end.len());
        s.push_str(&d.start);
        s.push_str(self.key);
        s.push_str(&d.end);
        s
    }
}

/// Insertion-ordered mapping of placeholder key to replacement text.
///
/// Built once per replace call. The fixed-arity constructors are shorthands
/// for [`ReplacementTable::from_pairs`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplacementTable {
    entries: Vec<(String, String)>,
    delimiters: Delimiters,
}

impl ReplacementTable {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (k, v) in pairs {
            let key = k.into();
            if key.is_empty() {
                return Err(WorkdocError::invalid("placeholder key must be non-empty"));
            }
            let value = v.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Self {
            entries,
            delimiters: Delimiters::default(),
        })
    }

    pub fn one(k1: &str, v1: &str) -> Result<Self> {
        Self::from_pairs([(k1, v1)])
    }

    pub fn two(k1: &str, v1: &str, k2: &str, v2: &str) -> Result<Self> {
        Self::from_pairs([(k1, v1), (k2, v2)])
    }

    pub fn three(k1: &str, v1: &str, k2: &str, v2: &str, k3: &str, v3: &str) -> Result<Self> {
        Self::from_pairs([(k1, v1), (k2, v2), (k3, v3)])
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder<'_>> {
        self.entries.iter().map(move |(k, _)| Placeholder {
            key: k.as_str(),
            delimiters: &self.delimiters,
        })
    }
}

/// Split a `key=value` assignment. The value may itself contain `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| WorkdocError::invalid(format!("expected key=value, got {s:?}")))?;
    if k.is_empty() {
        return Err(WorkdocError::invalid(format!("empty key in {s:?}")));
    }
    Ok((k.to_string(), v.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn later_duplicate_overwrites_in_place() {
        let t = ReplacementTable::from_pairs([("a", "1"), ("b", "2"), ("a", "3")]).unwrap();
        let got: Vec<_> = t.iter().collect();
        assert_eq!(got, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn fixed_arity_matches_mapping() {
        let three = ReplacementTable::three("x", "1", "y", "", "z", "3").unwrap();
        let map: BTreeMap<&str, &str> = [("x", "1"), ("y", ""), ("z", "3")].into_iter().collect();
        assert_eq!(three, ReplacementTable::from_pairs(map).unwrap());
        assert_eq!(three.get("y"), Some(""));
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = ReplacementTable::two("ok", "v", "", "v").unwrap_err();
        assert!(matches!(err, WorkdocError::InvalidArgument(_)));
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        assert!(Delimiters::new("", "}").is_err());
        assert!(Delimiters::new("${", "}").is_ok());
    }

    #[test]
    fn placeholder_renders_with_custom_delimiters() {
        let t = ReplacementTable::one("name", "Ada")
            .unwrap()
            .with_delimiters(Delimiters::new("[[", "]]").unwrap());
        let rendered: Vec<String> = t.placeholders().map(|p| p.render()).collect();
        assert_eq!(rendered, vec!["[[name]]".to_string()]);
    }

    #[test]
    fn assignment_keeps_equals_in_value() {
        assert_eq!(
            parse_assignment("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=v").is_err());
        assert_eq!(parse_assignment("k=").unwrap().1, "");
    }
}
