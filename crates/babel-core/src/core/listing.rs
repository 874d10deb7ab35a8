use std::collections::BTreeMap;

/// A multi-valued, key-ordered mapping produced by the `-L` listing modes.
///
/// `obabel` reports some keys more than once (several extensions share one
/// description, for example), so every value is kept in arrival order instead
/// of overwriting earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    entries: BTreeMap<String, Vec<String>>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// All values recorded for `key`, oldest first.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every `(key, value)` pair, keys in order and values in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |v| (key.as_str(), v.as_str())))
    }

    /// Number of `(key, value)` pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses `obabel -L formats read` output.
///
/// Each record is `<extension> -- <description>`; the result maps every
/// description to the extensions that carry it.
pub fn parse_format_listing(output: &str) -> Listing {
    let mut listing = Listing::new();
    for line in output.lines() {
        let Some((extension, rest)) = split_token(line) else {
            continue;
        };
        let Some(description) = rest.strip_prefix("--") else {
            continue;
        };
        if !description.starts_with(char::is_whitespace) {
            continue;
        }
        let description = description.trim();
        if !description.is_empty() {
            listing.insert(description, extension);
        }
    }
    listing
}

/// Parses `obabel -L forcefields` output.
///
/// Each record is `<name> <description>` with an optional trailing period,
/// which is dropped. The result maps every force-field name to its descriptions.
pub fn parse_forcefield_listing(output: &str) -> Listing {
    let mut listing = Listing::new();
    for line in output.lines() {
        let Some((name, rest)) = split_token(line) else {
            continue;
        };
        let description = rest.trim_end();
        let description = description.strip_suffix('.').unwrap_or(description);
        if !description.is_empty() {
            listing.insert(name, description);
        }
    }
    listing
}

fn split_token(line: &str) -> Option<(&str, &str)> {
    let (token, rest) = line.trim().split_once(char::is_whitespace)?;
    Some((token, rest.trim_start()))
}
