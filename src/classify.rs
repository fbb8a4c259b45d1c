use std::fmt;

use crate::entry::Entry;

/// Top-level sections of a rendered publication list, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Preprints,
    Books,
    BookChapters,
    JournalArticles,
    ConferenceArticles,
    ConferenceAbstracts,
    ResearchReports,
    Theses,
    Miscellaneous,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Preprints,
        Category::Books,
        Category::BookChapters,
        Category::JournalArticles,
        Category::ConferenceArticles,
        Category::ConferenceAbstracts,
        Category::ResearchReports,
        Category::Theses,
        Category::Miscellaneous,
    ];

    /// Section heading.
    pub fn title(self) -> &'static str {
        match self {
            Category::Preprints => "Preprints",
            Category::Books => "Books",
            Category::BookChapters => "Book Chapters",
            Category::JournalArticles => "Journal Articles",
            Category::ConferenceArticles => "Conference Articles",
            Category::ConferenceAbstracts => "Conference Abstracts",
            Category::ResearchReports => "Research Reports",
            Category::Theses => "Theses",
            Category::Miscellaneous => "Miscellaneous",
        }
    }

    /// Short label for the navigation line.
    pub fn nav_label(self) -> &'static str {
        match self {
            Category::JournalArticles => "Journals",
            Category::ConferenceArticles => "Conferences",
            Category::ConferenceAbstracts => "Abstracts",
            other => other.title(),
        }
    }

    pub fn anchor(self) -> String {
        anchor_name(self.title())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// HTML anchor for a section name: years become `year2020`, anything else is lowercased with
/// spaces turned into dashes.
pub fn anchor_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
        format!("year{name}")
    } else {
        name.to_lowercase().replace(' ', "-")
    }
}

/// Entry types that count as conference papers and conference abstracts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSets {
    pub conference_paper: Vec<String>,
    pub conference_abstract: Vec<String>,
}

impl TypeSets {
    pub fn is_conference_paper(&self, entry_type: &str) -> bool {
        self.conference_paper.iter().any(|t| t == entry_type)
    }

    pub fn is_conference_abstract(&self, entry_type: &str) -> bool {
        self.conference_abstract.iter().any(|t| t == entry_type)
    }
}

impl Default for TypeSets {
    fn default() -> Self {
        TypeSets {
            conference_paper: vec!["inproceedings".into()],
            conference_abstract: vec!["conference".into()],
        }
    }
}

/// Assign `entry` to exactly one category. The first matching rule wins, and an arXiv/eprint
/// identifier outranks the declared type.
pub fn classify(entry: &Entry, types: &TypeSets) -> Category {
    let t = entry.entry_type.as_str();
    if entry.get_nonempty("eprint").is_some() || entry.get_nonempty("arxiv").is_some() {
        Category::Preprints
    } else if t == "book" {
        Category::Books
    } else if t == "inbook" {
        Category::BookChapters
    } else if t == "article" {
        Category::JournalArticles
    } else if types.is_conference_paper(t) {
        Category::ConferenceArticles
    } else if types.is_conference_abstract(t) {
        Category::ConferenceAbstracts
    } else if t == "techreport" {
        Category::ResearchReports
    } else if t == "phdthesis" {
        Category::Theses
    } else {
        Category::Miscellaneous
    }
}

/// Split `entries` into per-category lists, skipping empty categories.
pub fn group<'a>(entries: &[&'a Entry], types: &TypeSets) -> Vec<(Category, Vec<&'a Entry>)> {
    Category::ALL
        .iter()
        .map(|&cat| {
            let members = entries
                .iter()
                .copied()
                .filter(|e| classify(e, types) == cat)
                .collect::<Vec<_>>();
            (cat, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}
