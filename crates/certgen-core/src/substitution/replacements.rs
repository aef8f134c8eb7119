//! Ordered marker -> replacement table.

use crate::error::ProfileError;

/// Marker to replacement mapping that keeps insertion order.
///
/// Keys are unique. Inserting an existing key updates its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    entries: Vec<(String, String)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ProfileError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (marker, value) in pairs {
            map.insert(marker, value)?;
        }
        Ok(map)
    }

    /// Add or update a marker. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        marker: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ProfileError> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(ProfileError::EmptyKey);
        }
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == marker) {
            Some((_, existing)) => Ok(Some(std::mem::replace(existing, value))),
            None => {
                self.entries.push((marker, value));
                Ok(None)
            }
        }
    }

    pub fn get(&self, marker: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == marker)
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

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Whether any marker occurs in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.markers().any(|marker| text.contains(marker))
    }

    /// Replace every marker in order. Each step sees the previous result.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (marker, value) in &self.entries {
            if out.contains(marker.as_str()) {
                out = out.replace(marker.as_str(), value);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reinsert_keeps_position() {
        let mut map = ReplacementMap::new();
        map.insert("a", "1").unwrap();
        map.insert("b", "2").unwrap();
        let previous = map.insert("a", "3").unwrap();

        assert_eq!(previous.as_deref(), Some("1"));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut map = ReplacementMap::new();
        assert!(matches!(map.insert("", "x"), Err(ProfileError::EmptyKey)));
        assert!(map.is_empty());
    }

    #[test]
    fn test_apply_is_sequential() {
        let map = ReplacementMap::from_pairs([("{a}", "{b}"), ("{b}", "done")]).unwrap();
        assert_eq!(map.apply("x {a} y"), "x done y");

        let reversed = ReplacementMap::from_pairs([("{b}", "done"), ("{a}", "{b}")]).unwrap();
        assert_eq!(reversed.apply("x {a} y"), "x {b} y");
    }

    #[test]
    fn test_matches() {
        let map = ReplacementMap::from_pairs([("{{ input_job }}", "инженер")]).unwrap();
        assert!(map.matches("Должность: {{ input_job }}"));
        assert!(!map.matches("Должность: {{input_job}}"));
    }
}
