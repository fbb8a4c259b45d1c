//! HTML output.
//!
//! A [`Renderer`] is built once per run from the configuration and the (optional) citation
//! table. [`entry`] turns single entries into `<li>` items and [`page`] assembles whole pages
//! out of them.

pub mod entry;
pub mod page;

pub use page::OutputFiles;

use crate::{
    citation::CitationTable,
    classify::TypeSets,
    compare::Comparator,
    config::{Config, ShowCitation},
    count,
    entry::Entry,
};

pub struct Renderer<'a> {
    config: &'a Config,
    citations: Option<&'a CitationTable>,
    comparator: Comparator,
    types: TypeSets,
    journal_fullnames_lower: Vec<String>,
    citation_year: i32,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a Config, citations: Option<&'a CitationTable>) -> Self {
        Renderer {
            config,
            citations,
            comparator: Comparator::new(config.highlights(), config.type_sets()),
            types: config.type_sets(),
            journal_fullnames_lower: config
                .journal_fullname_highlighted
                .iter()
                .map(|n| n.to_lowercase())
                .collect(),
            citation_year: config.show_citation_year(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    pub fn types(&self) -> &TypeSets {
        &self.types
    }

    /// Everything up to and including the opening of the content `<div>`.
    pub fn prelog(&self) -> String {
        self.prelog_titled(&self.config.title)
    }

    pub fn prelog_titled(&self, title: &str) -> String {
        let c = self.config;
        let scholar_js = match c.show_citation {
            ShowCitation::ScholarJs => c.scholar_js.as_str(),
            _ => "",
        };
        format!(
            r#"<!DOCTYPE HTML
    PUBLIC "-//W3C//DTD HTML 4.01//EN"
    "https://www.w3.org/TR/html4/strict.dtd">
<head>
<meta http-equiv=Content-Type content="text/html; charset={encoding}">
<title>{title}</title>

<script type="text/javascript" src="https://code.jquery.com/jquery-2.2.0.min.js"></script>
<link rel="stylesheet" href="{bootstrap}">
<script src="https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/js/bootstrap.min.js"></script>
<script type="text/javascript" src="{scholar_js}"></script>

<script type="text/javascript">
    function toggle(showHideDiv, switchTextDiv)
    {{
    var ele = document.getElementById(showHideDiv);
    if(ele.style.display == "block")
    {{
        ele.style.display = "none";
    }}
    else
    {{
        ele.style.display = "block";
    }}
    }}
</script>

<link rel="stylesheet" type="text/css" href="{css}">
<style type="text/css">
</style>

</head>
<body>

<div id="content">
<br>
"#,
            encoding = c.encoding,
            bootstrap = c.bootstrap_css,
            css = c.css_file,
        )
    }

    /// Closes the page. With scholar.js enabled the profile is loaded here.
    pub fn afterlog(&self) -> String {
        let c = self.config;
        let id = c.google_scholar_id.trim();
        if c.show_citation == ShowCitation::ScholarJs && !id.is_empty() {
            format!(
                "\n<br>\n<script type=\"text/javascript\">\nScholar.load(\"{id}\");\n</script>\n</div>\n</body>\n</html>\n"
            )
        } else {
            "\n<br>\n</div>\n</body>\n</html>\n".to_string()
        }
    }

    /// Title, total citations and venue counts, each when enabled.
    pub fn header(&self, entries: &[&Entry]) -> String {
        let c = self.config;
        let mut out = String::new();
        if c.show_page_title {
            out.push_str(&format!("<h1>{}</h1>\n\n", c.title));
        }
        if c.show_total_citation
            && let Some(table) = self.citations
        {
            out.push_str(&table.summary_html(&c.target_link_citation));
            out.push_str("\n\n");
        }
        if c.show_count_number {
            let counts = count::count_by_venue(entries, &c.venue_groups());
            out.push_str(&count::count_html(&counts));
            out.push_str("\n\n");
        }
        out
    }
}
