//! Display ordering of entries.
//!
//! Both orderings return [`Ordering::Less`] when the first entry should be listed before the
//! second, so a stable `sort_by` produces the rendered order directly: newest first, then by
//! publication type, then highlighted venues and authors first. Pairs that nothing
//! distinguishes compare equal and keep their input order.

use std::cmp::Ordering;

use crate::{
    classify::TypeSets,
    entry::Entry,
    select::{AuthorRole, is_author_selected},
};

/// Names and abbreviations that receive emphasis and ordering priority.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlights {
    pub journal_shortnames: Vec<String>,
    pub journal_fullnames: Vec<String>,
    pub conference_shortnames: Vec<String>,
    pub authors: Vec<String>,
}

type TieBreak = fn(&Comparator, &Entry, &Entry) -> Ordering;

/// Stages of the by-type ordering.
///
/// NOTE: Ordering is important here. A later stage is only consulted when every earlier one
/// reports a tie.
static BY_TYPE_CHAIN: &[TieBreak] = &[
    Comparator::type_rank,
    Comparator::journal_highlight,
    Comparator::conference_highlight,
    Comparator::author_highlight,
];

pub struct Comparator {
    highlights: Highlights,
    journal_fullnames_lower: Vec<String>,
    types: TypeSets,
}

impl Comparator {
    pub fn new(highlights: Highlights, types: TypeSets) -> Self {
        let journal_fullnames_lower = highlights
            .journal_fullnames
            .iter()
            .map(|n| n.to_lowercase())
            .collect();
        Comparator {
            highlights,
            journal_fullnames_lower,
            types,
        }
    }

    /// Newest first, undated entries last, same year decided by [`Comparator::by_type`].
    pub fn by_year(&self, a: &Entry, b: &Entry) -> Ordering {
        match (a.year.numeric(), b.year.numeric()) {
            (Some(x), Some(y)) => y.cmp(&x).then_with(|| self.by_type(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn by_type(&self, a: &Entry, b: &Entry) -> Ordering {
        BY_TYPE_CHAIN
            .iter()
            .map(|stage| stage(self, a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub fn sort_by_year(&self, entries: &mut [&Entry]) {
        entries.sort_by(|a, b| self.by_year(a, b));
    }

    pub fn sort_by_type(&self, entries: &mut [&Entry]) {
        entries.sort_by(|a, b| self.by_type(a, b));
    }

    /// Theses, then books and chapters, journal articles, conference papers, the literal
    /// `conferences` type, then everything else.
    fn rank(&self, entry_type: &str) -> u8 {
        match entry_type {
            "phdthesis" => 0,
            "book" | "inbook" => 1,
            "article" => 2,
            t if self.types.is_conference_paper(t) => 3,
            "conferences" => 4,
            _ => 5,
        }
    }

    fn type_rank(&self, a: &Entry, b: &Entry) -> Ordering {
        self.rank(&a.entry_type).cmp(&self.rank(&b.entry_type))
    }

    fn journal_highlight(&self, a: &Entry, b: &Entry) -> Ordering {
        if a.entry_type != "article" || b.entry_type != "article" {
            return Ordering::Equal;
        }
        let ha = self.is_journal_highlighted(a.get("journal").unwrap_or_default());
        let hb = self.is_journal_highlighted(b.get("journal").unwrap_or_default());
        hb.cmp(&ha)
    }

    fn conference_highlight(&self, a: &Entry, b: &Entry) -> Ordering {
        if !self.types.is_conference_paper(&a.entry_type)
            || !self.types.is_conference_paper(&b.entry_type)
        {
            return Ordering::Equal;
        }
        let ha = self.is_conference_highlighted(a.get("booktitle").unwrap_or_default());
        let hb = self.is_conference_highlighted(b.get("booktitle").unwrap_or_default());
        hb.cmp(&ha)
    }

    fn author_highlight(&self, a: &Entry, b: &Entry) -> Ordering {
        let names = &self.highlights.authors;
        if names.is_empty() {
            return Ordering::Equal;
        }
        let ha = is_author_selected(a, names, AuthorRole::FirstOrCorresponding);
        let hb = is_author_selected(b, names, AuthorRole::FirstOrCorresponding);
        hb.cmp(&ha)
    }

    /// A journal is highlighted by a `(TMI)`-style short name or a case-insensitive full name.
    pub fn is_journal_highlighted(&self, journal: &str) -> bool {
        self.highlights
            .journal_shortnames
            .iter()
            .any(|w| journal.contains(&format!("({w})")))
            || {
                let lower = journal.to_lowercase();
                self.journal_fullnames_lower
                    .iter()
                    .any(|w| lower.contains(w.as_str()))
            }
    }

    /// Conference short names are recognised by the year suffix that follows them, as in
    /// `MICCAI'17`.
    pub fn is_conference_highlighted(&self, booktitle: &str) -> bool {
        self.highlights
            .conference_shortnames
            .iter()
            .any(|w| booktitle.contains(&format!("{w}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparator(authors: &[&str]) -> Comparator {
        Comparator::new(
            Highlights {
                journal_shortnames: vec!["TMI".into(), "MedIA".into()],
                journal_fullnames: vec!["NeuroImage".into()],
                conference_shortnames: vec!["MICCAI".into()],
                authors: authors.iter().map(|a| a.to_string()).collect(),
            },
            TypeSets::default(),
        )
    }

    fn entry(t: &str, id: &str, year: &str) -> Entry {
        Entry::new(t, id).with("year", year)
    }

    fn ids(entries: &[&Entry]) -> Vec<String> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn undated_entries_sort_last() {
        let cmp = comparator(&[]);
        let (a, b, c) = (
            entry("misc", "na", "n/a"),
            entry("misc", "old", "2019"),
            entry("misc", "new", "2020"),
        );
        let mut list = vec![&a, &b, &c];
        cmp.sort_by_year(&mut list);
        let years: Vec<String> = list.iter().map(|e| e.year.to_string()).collect();
        assert_eq!(years, vec!["2020", "2019", "n/a"]);
    }

    #[test]
    fn same_year_falls_back_to_type_order() {
        let cmp = comparator(&[]);
        let conf = entry("inproceedings", "conf", "2020");
        let art = entry("article", "art", "2020");
        let thesis = entry("phdthesis", "thesis", "2020");
        let book = entry("book", "book", "2020");
        let report = entry("techreport", "report", "2020");
        let mut list = vec![&report, &conf, &art, &book, &thesis];
        cmp.sort_by_year(&mut list);
        assert_eq!(ids(&list), vec!["thesis", "book", "art", "conf", "report"]);
    }

    #[test]
    fn highlighted_journal_listed_first() {
        let cmp = comparator(&[]);
        let plain = entry("article", "plain", "2020").with("journal", "Some Other Journal");
        let tmi = entry("article", "tmi", "2020")
            .with("journal", "IEEE Transactions on Medical Imaging (TMI)");
        let neuro = entry("article", "neuro", "2020").with("journal", "neuroimage");
        assert_eq!(cmp.by_type(&tmi, &plain), Ordering::Less);
        assert_eq!(cmp.by_type(&plain, &tmi), Ordering::Greater);
        assert_eq!(cmp.by_type(&tmi, &neuro), Ordering::Equal);

        let mut list = vec![&plain, &tmi];
        cmp.sort_by_year(&mut list);
        assert_eq!(ids(&list), vec!["tmi", "plain"]);
    }

    #[test]
    fn highlighted_conference_needs_year_suffix() {
        let cmp = comparator(&[]);
        let miccai = entry("inproceedings", "m", "2017").with("booktitle", "Proc. (MICCAI'17)");
        let bare = entry("inproceedings", "b", "2017").with("booktitle", "MICCAI Workshop");
        assert_eq!(cmp.by_type(&miccai, &bare), Ordering::Less);
        assert!(!cmp.is_conference_highlighted("MICCAI Workshop"));
    }

    #[test]
    fn highlighted_author_breaks_remaining_ties() {
        let cmp = comparator(&["Jane Doe"]);
        let other = entry("techreport", "other", "2020").with("author", "John Smith, Jane Doe");
        let first = entry("techreport", "first", "2020").with("author", "Jane Doe, John Smith");
        let corr = entry("techreport", "corr", "2020")
            .with("author", "John Smith, Jane Doe")
            .with("author_corresponding", "Jane Doe");
        let mut list = vec![&other, &first, &corr];
        cmp.sort_by_type(&mut list);
        assert_eq!(ids(&list), vec!["first", "corr", "other"]);
    }

    #[test]
    fn unranked_types_tie_and_keep_input_order() {
        let cmp = comparator(&[]);
        let report = entry("techreport", "report", "2020");
        let misc = entry("misc", "misc", "2020");
        assert_eq!(cmp.by_type(&report, &misc), Ordering::Equal);
        assert_eq!(cmp.by_type(&misc, &report), Ordering::Equal);
        let mut list = vec![&misc, &report];
        cmp.sort_by_year(&mut list);
        assert_eq!(ids(&list), vec!["misc", "report"]);
    }

    #[test]
    fn by_year_is_antisymmetric() {
        let cmp = comparator(&["Jane Doe"]);
        let types = ["article", "inproceedings", "book", "phdthesis", "misc", "conferences"];
        proptest::proptest!(|(
            ta in proptest::sample::select(types.to_vec()),
            tb in proptest::sample::select(types.to_vec()),
            ya in proptest::sample::select(vec!["2019", "2020", "n/a"]),
            yb in proptest::sample::select(vec!["2019", "2020", "n/a"]),
            hl in proptest::bool::ANY,
        )| {
            let a = entry(ta, "a", ya)
                .with("journal", if hl { "X (TMI)" } else { "X" })
                .with("author", "Jane Doe");
            let b = entry(tb, "b", yb).with("journal", "Y").with("author", "John Smith");
            proptest::prop_assert_eq!(cmp.by_year(&a, &b), cmp.by_year(&b, &a).reverse());
        })
    }
}
