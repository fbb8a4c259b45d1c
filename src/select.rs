use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{entry::Entry, error::ConfigError};

/// A raw value from a `selection_and` / `selection_or` table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    Int(i64),
    Name(String),
}

pub type SelectionTable = BTreeMap<String, Vec<SelectionValue>>;

/// Which author position a name check looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorRole {
    /// The first listed author, or anyone named in an `author_first` field.
    First,
    /// Anyone named in an `author_corresponding` field.
    Corresponding,
    /// Either of the above.
    FirstOrCorresponding,
}

/// Whether any of `names` holds the given role on `entry`.
pub fn is_author_selected(entry: &Entry, names: &[String], role: AuthorRole) -> bool {
    let listed = |list: Vec<&str>| list.iter().any(|n| names.iter().any(|m| m == n));
    match role {
        AuthorRole::First => {
            entry
                .authors()
                .first()
                .is_some_and(|first| names.iter().any(|n| n == first))
                || listed(entry.authors_first())
        }
        AuthorRole::Corresponding => listed(entry.authors_corresponding()),
        AuthorRole::FirstOrCorresponding => {
            is_author_selected(entry, names, AuthorRole::First)
                || is_author_selected(entry, names, AuthorRole::Corresponding)
        }
    }
}

/// One typed selection condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Year(Vec<i64>),
    Author(Vec<String>),
    AuthorFirst(Vec<String>),
    AuthorCorresponding(Vec<String>),
}

impl Condition {
    fn from_pair(key: &str, values: &[SelectionValue]) -> Result<Self, ConfigError> {
        match key {
            "year" => values
                .iter()
                .map(|v| match v {
                    SelectionValue::Int(y) => Ok(*y),
                    SelectionValue::Name(n) => Err(ConfigError::SelectionValueType {
                        key: key.to_string(),
                        expected: "integer",
                        got: n.clone(),
                    }),
                })
                .collect::<Result<_, _>>()
                .map(Condition::Year),
            "author" | "author_first" | "author_corresponding" => {
                let names = values
                    .iter()
                    .map(|v| match v {
                        SelectionValue::Name(n) => Ok(n.clone()),
                        SelectionValue::Int(i) => Err(ConfigError::SelectionValueType {
                            key: key.to_string(),
                            expected: "name",
                            got: i.to_string(),
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match key {
                    "author" => Condition::Author(names),
                    "author_first" => Condition::AuthorFirst(names),
                    _ => Condition::AuthorCorresponding(names),
                })
            }
            other => Err(ConfigError::UnsupportedSelectionKey(other.to_string())),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Condition::Year(years) => entry
                .year
                .numeric()
                .and_then(|y| i64::try_from(y).ok())
                .is_some_and(|y| years.contains(&y)),
            Condition::Author(names) => entry
                .authors()
                .iter()
                .any(|a| names.iter().any(|n| n == a)),
            Condition::AuthorFirst(names) => is_author_selected(entry, names, AuthorRole::First),
            Condition::AuthorCorresponding(names) => {
                is_author_selected(entry, names, AuthorRole::Corresponding)
            }
        }
    }
}

/// Filters the working set against the configured selection rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// No rules: everything is selected.
    All,
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Selector {
    /// Validate both tables up front. Using both at once, or any key outside `year`, `author`,
    /// `author_first` and `author_corresponding`, is rejected.
    pub fn new(and: &SelectionTable, or: &SelectionTable) -> Result<Self, ConfigError> {
        let build = |table: &SelectionTable| {
            table
                .iter()
                .map(|(k, v)| Condition::from_pair(k, v))
                .collect::<Result<Vec<_>, _>>()
        };
        match (and.is_empty(), or.is_empty()) {
            (true, true) => Ok(Selector::All),
            (false, false) => Err(ConfigError::ConflictingSelection),
            (false, true) => Ok(Selector::And(build(and)?)),
            (true, false) => Ok(Selector::Or(build(or)?)),
        }
    }

    pub fn is_selected(&self, entry: &Entry) -> bool {
        match self {
            Selector::All => true,
            Selector::And(conds) => conds.iter().all(|c| c.matches(entry)),
            Selector::Or(conds) => conds.iter().any(|c| c.matches(entry)),
        }
    }
}
