//! Reading BibTeX into [`Entry`] records and writing cleaned records back out.

use std::collections::HashSet;

use anyhow::anyhow;
use biblatex::{Pair, RawBibliography, RawChunk, RawEntry, Spanned};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::{entry::Entry, normalize};

static ENTRY_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*@[A-Za-z]").unwrap());

// @string definitions may refer to each other.
const MAX_STRING_DEPTH: usize = 8;

/// Entries read from a bibliography, plus the number of records that had to be dropped.
#[derive(Debug)]
pub struct Parsed {
    pub entries: Vec<Entry>,
    pub skipped: usize,
}

/// Parse a bibliography, keeping entries in file order.
///
/// Field values are taken as written: TeX escapes, braces and `--` survive so that cleaning
/// can rewrite them. Only `@string` abbreviations and bare month names are expanded.
///
/// The whole text is tried first. When that fails the text is cut at every `@type` line and
/// each piece parsed on its own, so one broken record does not take the rest down with it.
pub fn parse(text: &str) -> anyhow::Result<Parsed> {
    let (raw, mut skipped) = match RawBibliography::parse(text) {
        Ok(bib) => (bib, 0),
        Err(e) => {
            warn!("bibliography did not parse as a whole ({e}); parsing entry by entry");
            parse_individually(text)
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.entries.len());
    for spanned in &raw.entries {
        let record = &spanned.v;
        if !seen.insert(record.key.v) {
            warn!("skipping duplicate entry {}", record.key.v);
            skipped += 1;
            continue;
        }
        entries.push(from_raw(record, &raw.abbreviations));
    }

    if entries.is_empty() && skipped > 0 {
        return Err(anyhow!("no bibliography entries could be parsed"));
    }
    Ok(Parsed { entries, skipped })
}

fn parse_individually(text: &str) -> (RawBibliography<'_>, usize) {
    let starts: Vec<usize> = ENTRY_START_RE.find_iter(text).map(|m| m.start()).collect();
    let mut out = RawBibliography {
        preamble: String::new(),
        entries: Vec::new(),
        abbreviations: Vec::new(),
    };
    let mut skipped = 0;
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        match RawBibliography::parse(&text[start..end]) {
            Ok(bib) => {
                out.entries.extend(bib.entries);
                out.abbreviations.extend(bib.abbreviations);
            }
            Err(e) => {
                let line = text[..start].lines().count() + 1;
                warn!("skipping entry at line {line}: {e}");
                skipped += 1;
            }
        }
    }
    (out, skipped)
}

fn from_raw(raw: &RawEntry<'_>, strings: &[Pair<'_>]) -> Entry {
    let mut entry = Entry::new(raw.kind.v, raw.key.v);
    for pair in &raw.fields {
        let value = field_text(&pair.value.v, strings, 0);
        entry.set(pair.key.v, value.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    debug!(id = %entry.id, entry_type = %entry.entry_type, "parsed entry");
    entry
}

/// Concatenate the parts of a `#`-joined field value.
fn field_text(field: &[Spanned<RawChunk<'_>>], strings: &[Pair<'_>], depth: usize) -> String {
    let mut out = String::new();
    for chunk in field {
        match &chunk.v {
            RawChunk::Normal(s) => out.push_str(s),
            RawChunk::Abbreviation(name) => out.push_str(&abbreviation(name, strings, depth)),
        }
    }
    out
}

/// Expand an abbreviation: a matching `@string`, then a month name, else the name itself.
fn abbreviation(name: &str, strings: &[Pair<'_>], depth: usize) -> String {
    if depth < MAX_STRING_DEPTH
        && let Some(def) = strings.iter().find(|p| p.key.v.eq_ignore_ascii_case(name))
    {
        return field_text(&def.value.v, strings, depth + 1);
    }
    month_name(name).unwrap_or(name).to_string()
}

fn month_name(abbr: &str) -> Option<&'static str> {
    let name = match abbr.to_ascii_lowercase().as_str() {
        "jan" => "January",
        "feb" => "February",
        "mar" => "March",
        "apr" => "April",
        "may" => "May",
        "jun" => "June",
        "jul" => "July",
        "aug" => "August",
        "sep" => "September",
        "oct" => "October",
        "nov" => "November",
        "dec" => "December",
        _ => return None,
    };
    Some(name)
}

/// Render one entry as BibTeX.
///
/// Link fields are derived first, only fields named in `show_list` survive (in that order),
/// and the normalised author list goes back to `" and "`-separated form.
pub fn to_bibtex(entry: &Entry, show_list: &[String]) -> String {
    let mut entry = entry.clone();
    normalize::add_derived_fields(&mut entry);
    let joined = entry
        .get("author")
        .map(|a| a.split(", ").collect::<Vec<_>>().join(" and "));
    if let Some(joined) = joined {
        entry.set("author", joined);
    }

    let fields: Vec<String> = show_list
        .iter()
        .filter_map(|key| {
            let value = entry.get(key)?;
            Some(format!(" {key} = {{{value}}}"))
        })
        .collect();

    if fields.is_empty() {
        format!("@{}{{{}\n}}", entry.entry_type, entry.id)
    } else {
        format!("@{}{{{},\n{}\n}}", entry.entry_type, entry.id, fields.join(",\n"))
    }
}

/// All entries as one BibTeX document, separated by blank lines.
pub fn to_bibtex_document(entries: &[&Entry], show_list: &[String]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&to_bibtex(entry, show_list));
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entry::Year, normalize::normalize};

    const SAMPLE: &str = r#"
@article{smith2020,
  author = {Smith, John and Doe, Jane},
  title = {A {Study} of Things},
  journal = {IEEE Transactions on Medical Imaging (TMI)},
  year = {2020},
  pages = {1--10},
}

@conference{doe2019,
  author = {Doe, Jane},
  title = {An Abstract},
  booktitle = {ISMRM},
  year = 2019,
}

@misc{undated,
  author = {Nobody},
  title = {Someday},
  year = {n/a},
}
"#;

    fn show_list() -> Vec<String> {
        ["author", "title", "journal", "year", "pages", "url"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn parse_keeps_order_and_declared_types() {
        let parsed = parse(SAMPLE).expect("parse");
        assert_eq!(parsed.skipped, 0);
        let entries = parsed.entries;
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["smith2020", "doe2019", "undated"]);
        assert_eq!(entries[1].entry_type, "conference");
        assert_eq!(entries[0].year, Year::Numeric(2020));
        assert_eq!(entries[2].year, Year::Text("n/a".into()));
    }

    #[test]
    fn parse_then_normalize() {
        let mut entries = parse(SAMPLE).expect("parse").entries;
        normalize(&mut entries[0]);
        assert_eq!(entries[0].get("author"), Some("John Smith, Jane Doe"));
        assert_eq!(entries[0].get("title"), Some("A Study of Things"));
        assert_eq!(entries[0].get("pages"), Some("1&ndash;10"));
    }

    #[test]
    fn export_rejoins_authors_and_filters_fields() {
        let e = Entry::new("article", "k")
            .with("author", "John Smith, Jane Doe")
            .with("title", "T")
            .with("year", "2020")
            .with("abstract", "not exported")
            .with("doi", "10.1000/182");
        let out = to_bibtex(&e, &show_list());
        assert_eq!(
            out,
            "@article{k,\n author = {John Smith and Jane Doe},\n title = {T},\n year = {2020},\n url = {https://dx.doi.org/10.1000/182}\n}"
        );
        assert!(!out.lines().any(|l| l.trim().is_empty()));
    }

    #[test]
    fn tex_escapes_reach_the_cleaner() {
        let text = "@article{k,\n  title = {Caf\\'e with Fran\\c{c}ois},\n  author = {\\AA{}berg, Nils},\n  pages = {3--7},\n  year = {2020},\n}\n";
        let mut entries = parse(text).expect("parse").entries;
        assert_eq!(entries[0].get("title"), Some("Caf\\'e with Fran\\c{c}ois"));
        normalize(&mut entries[0]);
        assert_eq!(entries[0].get("title"), Some("Caf&eacute; with Fran&ccedil;ois"));
        assert_eq!(entries[0].get("author"), Some("Nils Åberg"));
        assert_eq!(entries[0].get("pages"), Some("3&ndash;7"));
    }

    #[test]
    fn strings_and_months_are_expanded() {
        let text = "@string{tmi = {IEEE Transactions on Medical Imaging}}\n\n@article{k,\n  journal = tmi # { (TMI)},\n  month = mar,\n  note = {two\n    lines},\n  year = 2021,\n}\n";
        let entries = parse(text).expect("parse").entries;
        assert_eq!(
            entries[0].get("journal"),
            Some("IEEE Transactions on Medical Imaging (TMI)")
        );
        assert_eq!(entries[0].get("month"), Some("March"));
        assert_eq!(entries[0].get("note"), Some("two lines"));
        assert_eq!(entries[0].year, Year::Numeric(2021));
    }

    #[test]
    fn duplicate_keys_keep_the_first_entry() {
        let text = "@article{k,\n  title = {First},\n}\n@misc{k,\n  title = {Second},\n}\n";
        let parsed = parse(text).expect("parse");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].get("title"), Some("First"));
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn broken_entry_does_not_sink_the_rest() {
        let text = "@article{good,\n  title = {Fine},\n  year = {2020},\n}\n\n@article{bad,\n  title = {Unclosed,\n\n@misc{also_good,\n  title = {Also fine},\n}\n";
        let parsed = parse(text).expect("parse");
        assert!(parsed.entries.iter().any(|e| e.id == "good"));
        assert!(parsed.entries.iter().any(|e| e.id == "also_good"));
        assert!(parsed.skipped >= 1);
    }
}
