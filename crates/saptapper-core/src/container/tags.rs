use std::io::{self, Write};

/// Ordered tag map; keys are unique and keep their first insertion position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tag.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Emit `key=value` lines; multi-line values repeat the key per line.
    /// Only `\n` separates lines, so a `\r` stays part of its line.
    pub fn write_lines<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (key, value) in self.iter() {
            for line in value.split_terminator('\n') {
                writeln!(out, "{}={}", key, line)?;
            }
        }
        Ok(())
    }

    /// Parse `key=value` lines, joining repeated keys with newlines.
    pub fn parse(text: &str) -> Self {
        let mut tags = Tags::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            match tags.entries.iter_mut().find(|(k, _)| k == key) {
                Some((_, existing)) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => tags.entries.push((key.to_string(), value.to_string())),
            }
        }
        tags
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for (key, value) in iter {
            tags.set(key, value);
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tags: &Tags) -> String {
        let mut out = Vec::new();
        tags.write_lines(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_multiline_value_repeats_key() {
        let tags: Tags = [("k", "a\nb")].into_iter().collect();
        assert_eq!(render(&tags), "k=a\nk=b\n");
    }

    #[test]
    fn test_carriage_return_is_kept() {
        let tags: Tags = [("k", "a\r\nb\n")].into_iter().collect();
        assert_eq!(render(&tags), "k=a\r\nk=b\n");
    }

    #[test]
    fn test_insertion_order_and_replace() {
        let mut tags = Tags::new();
        tags.set("_lib", "game.gsflib");
        tags.set("gsfby", "Saptapper");
        tags.set("_lib", "other.gsflib");
        assert_eq!(tags.len(), 2);
        assert_eq!(render(&tags), "_lib=other.gsflib\ngsfby=Saptapper\n");
    }

    #[test]
    fn test_empty_value_emits_nothing() {
        let tags: Tags = [("comment", "")].into_iter().collect();
        assert_eq!(render(&tags), "");
    }

    #[test]
    fn test_parse_joins_repeated_keys() {
        let tags = Tags::parse("_lib=x.gsflib\ncomment=one\ncomment=two\nnoise\n");
        assert_eq!(tags.get("_lib"), Some("x.gsflib"));
        assert_eq!(tags.get("comment"), Some("one\ntwo"));
        assert_eq!(tags.len(), 2);
    }
}
