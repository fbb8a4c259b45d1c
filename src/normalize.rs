//! Field cleanup and derived-field injection.
//!
//! Cleaning turns the TeX-flavoured values of a parsed record into the text the renderer prints;
//! derivation fills in `pdf`, `url` and `journal` from whatever identifiers the record carries.
//! Neither step ever fails: missing fields are simply left alone.

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

use crate::entry::Entry;

const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Escaped characters and their replacements. Applied in order, so `\AE` wins over `\AA`'s
/// prefix and `\O` is handled before the lowercase forms.
const ESCAPES: &[(&str, &str)] = &[
    ("\\AE", "Æ"),
    ("\\O", "Ø"),
    ("\\AA", "Å"),
    ("\\ae", "æ"),
    ("\\o", "ø"),
    ("\\aa", "å"),
    ("\\'a", "&aacute;"),
    ("\\'e", "&eacute;"),
    ("\\c{c}", "&ccedil;"),
];

/// Fields holding `" and "`-separated name lists.
pub const AUTHOR_FIELDS: &[&str] = &["author", "author_first", "author_corresponding"];

// \emph{...{...}*...}
static EMPH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\emph\{(?P<emph_text>(?:[^{}]*\{[^{}]*\})*.*?)\}").unwrap()
});

/// Clean every field, then inject derived link fields.
pub fn normalize(entry: &mut Entry) {
    clean(entry);
    add_derived_fields(entry);
}

/// Clean every field of `entry` in place.
pub fn clean(entry: &mut Entry) {
    for (key, value) in entry.fields_mut() {
        *value = clean_value(key, value);
    }
    entry.sync_year();
}

/// Clean a single field value.
pub fn clean_value(key: &str, raw: &str) -> String {
    let mut v = raw.trim().to_string();

    for (from, to) in ESCAPES {
        if v.contains(from) {
            v = v.replace(from, to);
        }
    }

    if v.contains("\\emph{") {
        v = EMPH_RE.replace_all(&v, "<I>${emph_text}</I>").into_owned();
    }

    // Braces in an abstract may be meaningful prose.
    if key != "abstract" {
        v.retain(|c| !matches!(c, '{' | '}' | '"'));
    }

    if v.ends_with(',') {
        v.pop();
    }

    if AUTHOR_FIELDS.contains(&key) {
        v = v
            .split(" and ")
            .map(|a| reorder_name(a.trim()))
            .collect::<Vec<_>>()
            .join(", ");
    }

    if key == "pages" {
        v = v
            .replace("--", "&ndash;")
            .replace(['-', '\u{2013}'], "&ndash;");
    }

    v
}

/// "Surname, Given" becomes "Given Surname"; anything without a comma is left as is.
fn reorder_name(name: &str) -> String {
    match name.split_once(',') {
        Some((surname, given)) => {
            let (surname, given) = (surname.trim(), given.trim());
            if given.is_empty() {
                surname.to_string()
            } else {
                format!("{given} {surname}")
            }
        }
        None => name.to_string(),
    }
}

/// Fill `pdf`, `url` and `journal` when they are absent or empty. Existing values are kept.
pub fn add_derived_fields(entry: &mut Entry) {
    if entry.get_nonempty("pdf").is_none()
        && let Some(pdf) = pdf_link(entry)
    {
        entry.set("pdf", pdf);
    }
    if entry.get_nonempty("url").is_none()
        && let Some(url) = www_link(entry)
    {
        entry.set("url", url);
    }
    if entry.get_nonempty("journal").is_none()
        && let Some(journal) = entry.get("eprint").map(str::to_string)
    {
        entry.set("journal", journal);
    }
}

/// Extract an arXiv identifier from `eprint`, `arxiv` or, failing those, `journal`.
///
/// When `eprint` or `arxiv` is present only that field is searched.
pub fn arxiv_id(entry: &Entry) -> Option<String> {
    let source = entry.get("eprint").or_else(|| entry.get("arxiv"));
    let haystack = source.or_else(|| entry.get("journal"))?.to_lowercase();
    haystack.split_whitespace().find_map(|word| {
        let pos = word.find("arxiv:")?;
        let id = &word[pos + "arxiv:".len()..];
        (!id.is_empty()).then(|| id.to_string())
    })
}

pub fn arxiv_abs_link(id: &str) -> String {
    format!("https://arxiv.org/abs/{id}")
}

/// Where to find the full text: explicit `pdf`, then arXiv, then HAL.
pub fn pdf_link(entry: &Entry) -> Option<String> {
    if let Some(pdf) = entry.get_nonempty("pdf") {
        return Some(pdf.to_string());
    }
    if let Some(id) = arxiv_id(entry) {
        return Some(format!("https://arxiv.org/pdf/{id}.pdf"));
    }
    entry
        .get_nonempty("hal_id")
        .map(|hal| format!("https://hal.archives-ouvertes.fr/{hal}/document"))
}

/// Landing page: explicit `url`, `www`, DOI resolver, arXiv abstract, then HAL.
pub fn www_link(entry: &Entry) -> Option<String> {
    if let Some(url) = entry.get_nonempty("url") {
        return Some(url.to_string());
    }
    if let Some(www) = entry.get_nonempty("www") {
        return Some(www.to_string());
    }
    if let Some(doi) = entry.get_nonempty("doi") {
        return Some(doi_link(doi));
    }
    if let Some(id) = arxiv_id(entry) {
        return Some(arxiv_abs_link(&id));
    }
    entry
        .get_nonempty("hal_id")
        .map(|hal| format!("https://hal.archives-ouvertes.fr/{hal}"))
}

fn doi_link(doi: &str) -> String {
    let enc = utf8_percent_encode(doi.trim(), PATH_SEGMENT_ENCODE_SET).to_string();
    format!("https://dx.doi.org/{enc}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(key: &str, raw: &str) -> String {
        clean_value(key, raw)
    }

    #[test]
    fn escapes_follow_the_table() {
        assert_eq!(cleaned("title", "\\AErø"), "Ærø");
        assert_eq!(cleaned("title", "\\O{}sterbro"), "Østerbro");
        assert_eq!(cleaned("title", "{\\AA}rhus"), "Århus");
        assert_eq!(cleaned("title", "Caf\\'e"), "Caf&eacute;");
        assert_eq!(cleaned("title", "Fran\\c{c}ois"), "Fran&ccedil;ois");
        assert_eq!(cleaned("title", "\\'a la carte"), "&aacute; la carte");
    }

    #[test]
    fn emph_becomes_italic() {
        assert_eq!(
            cleaned("title", "On \\emph{in vivo} imaging"),
            "On <I>in vivo</I> imaging"
        );
        assert_eq!(
            cleaned("title", "\\emph{a {B} c} and more"),
            "<I>a B c</I> and more"
        );
    }

    #[test]
    fn braces_and_quotes_stripped_except_abstract() {
        assert_eq!(cleaned("title", "{The} \"Best\" {Paper}"), "The Best Paper");
        assert_eq!(cleaned("abstract", "keep {these} braces"), "keep {these} braces");
    }

    #[test]
    fn single_trailing_comma_removed() {
        assert_eq!(cleaned("journal", "  NeuroImage, "), "NeuroImage");
        assert_eq!(cleaned("journal", "a,,"), "a,");
    }

    #[test]
    fn authors_are_reordered() {
        assert_eq!(
            cleaned("author", "Smith, John and Doe, Jane"),
            "John Smith, Jane Doe"
        );
        assert_eq!(
            cleaned("author", "John Smith and  Doe, Jane Q."),
            "John Smith, Jane Q. Doe"
        );
        assert_eq!(
            cleaned("author_corresponding", "van Dyk, David"),
            "David van Dyk"
        );
    }

    #[test]
    fn pages_use_en_dash() {
        assert_eq!(cleaned("pages", "10--20"), "10&ndash;20");
        assert_eq!(cleaned("pages", "10-20"), "10&ndash;20");
        assert_eq!(cleaned("pages", "10\u{2013}20"), "10&ndash;20");
    }

    #[test]
    fn clean_updates_typed_year() {
        let mut e = Entry::new("article", "k").with("year", "{2019}");
        clean(&mut e);
        assert_eq!(e.year, crate::entry::Year::Numeric(2019));
    }

    #[test]
    fn arxiv_id_from_eprint_or_journal() {
        let e = Entry::new("article", "a").with("eprint", "arXiv:1810.04805");
        assert_eq!(arxiv_id(&e).as_deref(), Some("1810.04805"));

        let e = Entry::new("article", "b").with("journal", "CoRR, arXiv:2101.00001 [cs.CV]");
        assert_eq!(arxiv_id(&e).as_deref(), Some("2101.00001"));

        // eprint present without the token: journal is not consulted.
        let e = Entry::new("article", "c")
            .with("eprint", "1234.5678")
            .with("journal", "arXiv:2101.00001");
        assert_eq!(arxiv_id(&e), None);
    }

    #[test]
    fn derived_links_priority() {
        let mut e = Entry::new("article", "k")
            .with("eprint", "arXiv:1810.04805")
            .with("doi", "10.1000/182")
            .with("hal_id", "hal-01234");
        add_derived_fields(&mut e);
        assert_eq!(e.get("pdf"), Some("https://arxiv.org/pdf/1810.04805.pdf"));
        assert_eq!(e.get("url"), Some("https://dx.doi.org/10.1000/182"));
        assert_eq!(e.get("journal"), Some("arXiv:1810.04805"));

        let mut e = Entry::new("techreport", "h").with("hal_id", "hal-01234");
        add_derived_fields(&mut e);
        assert_eq!(
            e.get("pdf"),
            Some("https://hal.archives-ouvertes.fr/hal-01234/document")
        );
        assert_eq!(e.get("url"), Some("https://hal.archives-ouvertes.fr/hal-01234"));
        assert_eq!(e.get("journal"), None);
    }

    #[test]
    fn derived_fields_keep_existing_values() {
        let mut e = Entry::new("article", "k")
            .with("pdf", "local.pdf")
            .with("url", "")
            .with("www", "https://example.org")
            .with("journal", "NeuroImage")
            .with("eprint", "arXiv:1810.04805");
        add_derived_fields(&mut e);
        assert_eq!(e.get("pdf"), Some("local.pdf"));
        assert_eq!(e.get("url"), Some("https://example.org"));
        assert_eq!(e.get("journal"), Some("NeuroImage"));
    }

    #[test]
    fn empty_link_fields_fall_through() {
        let mut e = Entry::new("article", "k")
            .with("www", "")
            .with("doi", "")
            .with("hal_id", "")
            .with("eprint", "arXiv:1810.04805");
        add_derived_fields(&mut e);
        assert_eq!(e.get("url"), Some("https://arxiv.org/abs/1810.04805"));

        let mut e = Entry::new("misc", "m").with("www", "").with("hal_id", "");
        add_derived_fields(&mut e);
        assert_eq!(e.get("url"), None);
        assert_eq!(e.get("pdf"), None);
    }

    fn tex_fragment() -> impl proptest::strategy::Strategy<Value = String> {
        use proptest::strategy::Strategy;
        let tokens = vec![
            "\\AE", "\\O", "\\AA", "\\ae", "\\o", "\\aa", "\\'a", "\\'e", "\\c{c}", "{", "}",
            "\"", "Word", "x", "\\emph{it}", "\\emph{a{b}c}",
        ];
        proptest::collection::vec(proptest::sample::select(tokens), 0..12)
            .prop_map(|v| v.concat())
    }

    #[test]
    fn cleaning_is_idempotent() {
        proptest::proptest!(|(s in tex_fragment())| {
            for key in ["title", "journal", "booktitle"] {
                let once = clean_value(key, &s);
                let twice = clean_value(key, &once);
                proptest::prop_assert!(
                    !once.contains(['{', '}', '"', '\\']),
                    "leftover markup in {:?}",
                    once
                );
                proptest::prop_assert_eq!(&once, &twice, "key {}", key);
            }
        })
    }
}
