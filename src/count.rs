use crate::entry::Entry;

/// Short name of the venue an entry appeared in.
///
/// `IEEE Transactions on Medical Imaging (TMI)` gives `TMI` and `Proc. of MICCAI (MICCAI'17)`
/// gives `MICCAI`; without parentheses the whole `journal` (or `booktitle`) is returned.
pub fn publisher_shortname(entry: &Entry) -> &str {
    let publisher = entry
        .get("journal")
        .or_else(|| entry.get("booktitle"))
        .unwrap_or_default();
    parenthesized_shortname(publisher).unwrap_or(publisher)
}

/// The abbreviation inside the first `(`, cut at `)` or at the `'` of a year suffix.
pub fn parenthesized_shortname(publisher: &str) -> Option<&str> {
    let open = publisher.find('(')?;
    let rest = &publisher[open + 1..];
    let end = rest.find(['\'', ')'])?;
    Some(&rest[..end])
}

/// Count entries per venue group.
///
/// Each group is a list of aliases whose first element is the display name. Groups nobody
/// published in are left out; the rest keep the configured order.
pub fn count_by_venue(entries: &[&Entry], groups: &[Vec<String>]) -> Vec<(String, usize)> {
    let mut counts = vec![0usize; groups.len()];
    for entry in entries {
        let name = publisher_shortname(entry);
        if name.is_empty() {
            continue;
        }
        if let Some(i) = groups
            .iter()
            .position(|aliases| aliases.iter().any(|a| a.eq_ignore_ascii_case(name)))
        {
            counts[i] += 1;
        }
    }
    groups
        .iter()
        .zip(counts)
        .filter(|(aliases, n)| *n > 0 && !aliases.is_empty())
        .map(|(aliases, n)| (aliases[0].clone(), n))
        .collect()
}

/// `<p>` line listing the non-zero venue counts.
pub fn count_html(counts: &[(String, usize)]) -> String {
    let mut out = String::from("<p>&#8226;&nbsp;");
    for (name, n) in counts {
        out.push_str(&format!("<b>{name}</b> ({n}) &#8226;&nbsp;"));
    }
    out.push_str("</p>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups() -> Vec<Vec<String>> {
        [
            vec!["Nature Methods"],
            vec!["TMI", "IEEE Transactions on Medical Imaging"],
            vec!["MedIA", "MIA", "Medical Image Analysis"],
            vec!["MICCAI"],
        ]
        .into_iter()
        .map(|g| g.into_iter().map(String::from).collect())
        .collect()
    }

    #[test]
    fn shortname_extraction() {
        let e = Entry::new("article", "a").with("journal", "IEEE Trans. Med. Imaging (TMI)");
        assert_eq!(publisher_shortname(&e), "TMI");
        let e = Entry::new("inproceedings", "b").with("booktitle", "Proc. (MICCAI'17)");
        assert_eq!(publisher_shortname(&e), "MICCAI");
        let e = Entry::new("article", "c").with("journal", "Medical Image Analysis");
        assert_eq!(publisher_shortname(&e), "Medical Image Analysis");
        assert_eq!(publisher_shortname(&Entry::new("misc", "d")), "");
    }

    #[test]
    fn counts_follow_group_order_and_skip_zeroes() {
        let a = Entry::new("article", "a").with("journal", "Medical Image Analysis");
        let b = Entry::new("article", "b").with("journal", "IEEE Trans. Med. Imaging (TMI)");
        let c = Entry::new("article", "c").with("journal", "X (mia)");
        let d = Entry::new("inproceedings", "d").with("booktitle", "Proc. (MICCAI'17)");
        let e = Entry::new("article", "e").with("journal", "Unknown Journal");
        let counts = count_by_venue(&[&a, &b, &c, &d, &e], &groups());
        assert_eq!(
            counts,
            vec![
                ("TMI".to_string(), 1),
                ("MedIA".to_string(), 2),
                ("MICCAI".to_string(), 1),
            ]
        );
        assert_eq!(
            count_html(&counts[..1]),
            "<p>&#8226;&nbsp;<b>TMI</b> (1) &#8226;&nbsp;</p>"
        );
    }
}
