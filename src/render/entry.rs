use crate::{
    bibliography,
    config::ShowCitation,
    entry::Entry,
    error::RenderError,
    normalize,
};

use super::Renderer;

const ABSTRACT_WIDTH: usize = 68;

fn modal(id: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<div class="modal fade" id="{id}" role="dialog"><div class="modal-dialog"><div class="modal-content"><div class="modal-header"><button type="button" class="close" data-dismiss="modal">&times;</button><h4 class="modal-title">{heading}</h4></div><div class="modal-body">
<pre>{body}</pre> </div><div class="modal-footer"><button type="button" class="btn btn-default" data-dismiss="modal">Close</button></div></div></div></div>"#
    )
}

/// Element id used for an entry's popups; `:` and `.` are not safe in selectors.
pub fn html_id(id: &str) -> String {
    id.replace([':', '.'], "-")
}

/// Greedy word wrap. Words longer than `width` are broken.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }
        let len = line.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

impl Renderer<'_> {
    /// Author list with highlighted names in bold and, optionally, first/corresponding marks.
    pub fn highlight_authors(&self, entry: &Entry) -> String {
        let c = self.config;
        let first = entry.authors_first();
        let corresponding = entry.authors_corresponding();
        entry
            .authors()
            .into_iter()
            .map(|name| {
                let shown = name.replace(' ', "&nbsp;");
                let mut out = if c.author_names_highlighted.iter().any(|h| h == name) {
                    format!("<b>{shown}</b>")
                } else {
                    shown
                };
                if c.show_author_sign {
                    if first.contains(&name) {
                        out.push_str(&c.author_sign.author_first);
                    }
                    if corresponding.contains(&name) {
                        out.push_str(&c.author_sign.author_corresponding);
                    }
                }
                out
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Bold a highlighted full venue name, or just the highlighted abbreviation in `(TMI)` or
    /// `(MICCAI'17)`.
    pub fn highlight_publisher(&self, publisher: &str) -> String {
        let c = self.config;
        if self
            .journal_fullnames_lower
            .contains(&publisher.to_lowercase())
        {
            return format!("<b>{publisher}</b>");
        }
        let Some(open) = publisher.find('(') else {
            return publisher.to_string();
        };
        let rest = &publisher[open + 1..];
        let Some(len) = rest.find('\'').or_else(|| rest.find(')')) else {
            return publisher.to_string();
        };
        let short = &rest[..len];
        let highlighted = c
            .journal_shortname_highlighted
            .iter()
            .chain(&c.conference_shortname_highlighted)
            .any(|w| w == short);
        if highlighted {
            format!(
                "{}<b>{short}</b>{}",
                &publisher[..=open],
                &rest[len..]
            )
        } else {
            publisher.to_string()
        }
    }

    fn shows_citation(&self, entry: &Entry) -> bool {
        self.config
            .show_citation_types
            .iter()
            .any(|t| *t == entry.entry_type)
            && entry
                .year
                .numeric()
                .is_some_and(|y| i128::from(y) <= i128::from(self.citation_year))
    }

    fn citation_link(&self, entry: &Entry) -> Result<Option<String>, RenderError> {
        let c = self.config;
        if c.show_citation == ShowCitation::No || !self.shows_citation(entry) {
            return Ok(None);
        }
        let title = entry.require("title")?;
        let out = match c.show_citation {
            ShowCitation::ScholarJs => format!(
                "\n[citations: <span class=\"scholar\" name=\"{title}\" with-link=\"true\" target=\"{}\"></span>]&nbsp;",
                c.target_link_citation
            ),
            _ => {
                let (count, link) = match self.citations.and_then(|t| t.lookup(title)) {
                    Some(hit) => (hit.count.as_str(), hit.link.as_str()),
                    None => (
                        "not found",
                        self.citations
                            .map(|t| t.profile_url.as_str())
                            .unwrap_or_default(),
                    ),
                };
                format!(
                    "\n[citations: <a target=\"{}\" href=\"{link}\">{count}</a>]&nbsp;",
                    c.target_link_citation
                )
            }
        };
        Ok(Some(out))
    }

    /// The description part: authors, title, venue, volume/pages and year.
    fn describe(&self, entry: &Entry, out: &mut String) -> Result<(), RenderError> {
        let c = self.config;
        let br = if c.single_line { "" } else { "<br>" };

        if entry.has("author") {
            out.push_str(&format!(
                "<span class=\"author\">{}</span>,{br}\n",
                self.highlight_authors(entry)
            ));
        }

        match entry.get("chapter") {
            Some(chapter) => {
                out.push_str(&format!("<span class=\"title\">\"{chapter}\"</span>,{br}"));
                out.push_str(&format!(
                    "in: {}, {}",
                    entry.require("title")?,
                    entry.require("publisher")?
                ));
            }
            None => out.push_str(&format!(
                "<span class=\"title\">\"{}\"</span>,{br}",
                entry.require("title")?
            )),
        }
        if entry.entry_type == "book" {
            out.push_str(entry.require("publisher")?);
        }
        out.push('\n');

        if let Some(journal) = entry.get("journal") {
            out.push_str(&format!(
                "<span class=\"publisher\">{}</span>",
                self.highlight_publisher(journal)
            ));
        } else if let Some(booktitle) = entry.get("booktitle") {
            let shown = if self.types.is_conference_paper(&entry.entry_type) {
                self.highlight_publisher(booktitle)
            } else {
                booktitle.to_string()
            };
            out.push_str(&format!("<span class=\"publisher\">{shown}</span>"));
        } else if let Some(eprint) = entry.get("eprint") {
            out.push_str(&format!(
                "<span class=\"publisher\">{}</span>",
                self.highlight_publisher(eprint)
            ));
        } else if entry.entry_type == "phdthesis" {
            out.push_str(&format!("PhD thesis, {}", entry.require("school")?));
        } else if entry.entry_type == "techreport" {
            out.push_str(&format!("Tech. Report, {}", entry.require("number")?));
        }

        if let Some(volume) = entry.get("volume") {
            out.push_str(&format!(", vol. {volume}"));
        }
        if entry.entry_type != "techreport"
            && let Some(number) = entry.get("number")
        {
            out.push_str(&format!(", no. {number}"));
        }
        if let Some(pages) = entry.get("pages") {
            out.push_str(&format!(", pp. {pages}"));
        }
        if let Some(month) = entry.get("month") {
            out.push_str(&format!(", {month}"));
        }
        out.push_str(&format!(
            ", <span class=\"year\">{}</span>.\n{br}",
            entry.require("year")?
        ));
        Ok(())
    }

    fn links(
        &self,
        entry: &Entry,
        bib_id: &str,
        show_abstract: bool,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let c = self.config;
        let target = &c.target_link;

        if let Some(pdf) = normalize::pdf_link(entry) {
            if c.use_icon && !c.icon_pdf.is_empty() {
                out.push_str(&format!(
                    "<a target=\"{target}\" href=\"{pdf}\"><img src=\"{}\" alt=\"[pdf]\" style=\"width: {size}; height: {size};\"></a>",
                    c.icon_pdf,
                    size = c.icon_size
                ));
            } else {
                out.push_str(&format!("[<a target=\"{target}\" href=\"{pdf}\">pdf</a>]"));
            }
            out.push_str("&nbsp;");
        }

        if let Some(www) = normalize::www_link(entry) {
            out.push('\n');
            if !c.use_icon {
                out.push('[');
            }
            out.push_str(&format!("<a target=\"{target}\" href=\"{www}\">"));
            if c.use_icon && !c.icon_www.is_empty() {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"[www]\" style=\"width: {size}; height: {size};\"></a>",
                    c.icon_www,
                    size = c.icon_size
                ));
            } else {
                out.push_str("link</a>");
            }
            if !c.use_icon {
                out.push(']');
            }
            out.push_str("&nbsp;");
        }

        if c.show_bibtex {
            out.push('\n');
            if c.use_bootstrap_dialog {
                out.push_str(&format!(
                    "[<a type=\"button\" data-toggle=\"modal\" data-target=\"#bib-{bib_id}\">bibtex</a>]&nbsp;"
                ));
            } else {
                out.push_str(&format!(
                    "[<a id=\"blk-{bib_id}\" href=\"javascript:toggle('bib-{bib_id}', 'blk-{bib_id}');\">bibtex</a>]&nbsp;"
                ));
            }
        }

        if show_abstract {
            out.push('\n');
            if c.use_bootstrap_dialog {
                out.push_str(&format!(
                    "[<a type=\"button\" data-toggle=\"modal\" data-target=\"#abs-{bib_id}\">abstract</a>]&nbsp;"
                ));
            } else {
                out.push_str(&format!(
                    "[<a id=\"alk-{bib_id}\" href=\"javascript:toggle('abs-{bib_id}', 'alk-{bib_id}');\">abstract</a>]&nbsp;"
                ));
            }
        }

        for field in &c.bibtex_fields_download {
            let Some(value) = entry.get_nonempty(field) else {
                continue;
            };
            let href = match (field.as_str(), normalize::arxiv_id(entry)) {
                ("arxiv", Some(id)) => normalize::arxiv_abs_link(&id),
                _ => value.to_string(),
            };
            out.push_str(&format!(
                "\n[<a target=\"{target}\" href=\"{href}\">{field}</a>]&nbsp;"
            ));
        }

        if let Some(citation) = self.citation_link(entry)? {
            out.push_str(&citation);
        }

        for field in &c.bibtex_fields_note {
            if let Some(value) = entry.get_nonempty(field) {
                let class = if field == "note" { "hlnote0" } else { field.as_str() };
                out.push_str(&format!("\n(<span class=\"{class}\">{value}</span>)&nbsp;"));
            }
        }
        out.push('\n');
        Ok(())
    }

    fn popups(&self, entry: &Entry, bib_id: &str, show_abstract: bool, out: &mut String) {
        let c = self.config;
        if c.show_bibtex {
            let bibtex = bibliography::to_bibtex(entry, &c.bibtex_show_list);
            out.push('\n');
            if c.use_bootstrap_dialog {
                out.push_str(&modal(&format!("bib-{bib_id}"), "Bibtex", &bibtex));
            } else {
                out.push_str(&format!(
                    "<div class=\"bibtex\" id=\"bib-{bib_id}\" style=\"display: none;\">\n<pre>{bibtex}</pre></div>"
                ));
            }
        }
        if show_abstract {
            let abstract_text = entry.get("abstract").unwrap_or_default();
            out.push('\n');
            if c.use_bootstrap_dialog {
                let wrapped = wrap(abstract_text, ABSTRACT_WIDTH).join("\n");
                out.push_str(&modal(&format!("abs-{bib_id}"), "Abstract", &wrapped));
            } else {
                out.push_str(&format!(
                    "<div class=\"abstract\" id=\"abs-{bib_id}\" style=\"display: none;\">{abstract_text}</div>"
                ));
            }
        }
    }

    /// One `<li>` item.
    pub fn entry_html(&self, entry: &Entry) -> Result<String, RenderError> {
        let c = self.config;
        let bib_id = html_id(&entry.id);
        let show_abstract = c.show_abstract && entry.get_nonempty("abstract").is_some();

        let mut out = String::from("\n<li>\n");
        self.describe(entry, &mut out)?;

        if !c.single_line {
            out.push_str("<div class=\"publilinks\">\n");
        }
        self.links(entry, &bib_id, show_abstract, &mut out)?;
        if !c.single_line {
            out.push_str("</div>");
        }

        self.popups(entry, &bib_id, show_abstract, &mut out);

        out.push_str("\n</li>");
        if c.add_blank_line_after_item {
            out.push_str("<br>");
        }
        out.push('\n');
        Ok(out)
    }
}
