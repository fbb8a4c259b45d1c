use std::{cmp::Reverse, collections::BTreeMap, fmt};

use crate::error::RenderError;

/// The publication year of an entry.
///
/// Only an all-digit value counts as a date; anything else (`n/a`, `in press`, ...) is kept for
/// display but always ordered after dated entries. Digit strings too long for a `u64` saturate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Year {
    Numeric(u64),
    Text(String),
    Missing,
}

impl Year {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Year::Numeric(raw.bytes().fold(0u64, |acc, b| {
                acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
            }))
        } else {
            Year::Text(raw.to_string())
        }
    }

    pub fn numeric(&self) -> Option<u64> {
        match self {
            Year::Numeric(y) => Some(*y),
            _ => None,
        }
    }

    /// Sort key for year sections: newest first, undated last.
    pub fn recency_key(&self) -> (bool, Reverse<u64>) {
        match self {
            Year::Numeric(y) => (false, Reverse(*y)),
            _ => (true, Reverse(0)),
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Numeric(y) => write!(f, "{y}"),
            Year::Text(t) => f.write_str(t),
            Year::Missing => Ok(()),
        }
    }
}

/// One bibliography record.
///
/// The type, citation key and year are always present and typed; every other field lives in a
/// free-form map keyed by the lowercase field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub entry_type: String,
    pub id: String,
    pub year: Year,
    fields: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(entry_type: impl Into<String>, id: impl Into<String>) -> Self {
        Entry {
            entry_type: entry_type.into().to_lowercase(),
            id: id.into(),
            year: Year::Missing,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style setter, mostly handy in tests.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Like [`Entry::get`], but treats an empty value as absent.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_lowercase();
        let value = value.into();
        if key == "year" {
            self.year = Year::parse(&value);
        }
        self.fields.insert(key, value);
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = (&String, &mut String)> {
        self.fields.iter_mut()
    }

    /// Re-derive the typed year after the field map was edited in place.
    pub(crate) fn sync_year(&mut self) {
        self.year = match self.fields.get("year") {
            Some(y) => Year::parse(y),
            None => Year::Missing,
        };
    }

    /// Fetch a field the renderer cannot do without.
    pub fn require(&self, key: &'static str) -> Result<&str, RenderError> {
        self.get(key).ok_or_else(|| RenderError::MissingField {
            id: self.id.clone(),
            field: key,
        })
    }

    /// The normalised author list, split back into individual names.
    pub fn authors(&self) -> Vec<&str> {
        split_names(self.get("author"))
    }

    pub fn authors_first(&self) -> Vec<&str> {
        split_names(self.get("author_first"))
    }

    pub fn authors_corresponding(&self) -> Vec<&str> {
        split_names(self.get("author_corresponding"))
    }
}

fn split_names(value: Option<&str>) -> Vec<&str> {
    match value {
        Some(v) => v.split(", ").collect(),
        None => Vec::new(),
    }
}
