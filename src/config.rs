//! Options controlling selection, ordering and rendering.
//!
//! Options come from an optional TOML file (either at top level or under a `[params]` table)
//! and from inline JSON objects given with `-i`; inline values replace file values key by key.
//! Unknown keys are rejected.
//!
//! ```toml
//! [params]
//! title = "Publications"
//! show_paper_style = "type_year"
//! bulleted_list = "ol_reversed"
//! author_names_highlighted = ["Jane Doe"]
//!
//! [params.selection_and]
//! author = ["Jane Doe"]
//! year = [2019, 2020]
//! ```

use std::path::Path;

use anyhow::Context;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    classify::TypeSets,
    compare::Highlights,
    error::ConfigError,
    select::{SelectionTable, Selector},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperStyle {
    Type,
    Year,
    #[serde(alias = "year_type")]
    TypeYear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletedList {
    Ol,
    Ul,
    OlReversed,
}

impl BulletedList {
    pub fn tags(self) -> (&'static str, &'static str) {
        match self {
            BulletedList::Ol => ("<ol>", "</ol>"),
            BulletedList::Ul => ("<ul>", "</ul>"),
            BulletedList::OlReversed => ("<ol reversed>", "</ol>"),
        }
    }
}

/// How citation counts are shown next to each entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShowCitation {
    #[serde(rename = "no")]
    No,
    /// Client-side lookup through the scholar.js script.
    #[serde(rename = "scholar.js")]
    ScholarJs,
    /// Counts scraped from the Google Scholar profile before rendering.
    #[serde(rename = "bs")]
    Scrape,
}

/// Marks appended to first and corresponding authors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorSign {
    pub author_first: String,
    pub author_corresponding: String,
}

impl Default for AuthorSign {
    fn default() -> Self {
        AuthorSign {
            author_first: "#".into(),
            author_corresponding: "*".into(),
        }
    }
}

/// A venue group is either a single name or a list of aliases headed by the display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VenueGroup {
    One(String),
    Aliases(Vec<String>),
}

impl VenueGroup {
    fn aliases(&self) -> Vec<String> {
        match self {
            VenueGroup::One(name) => vec![name.clone()],
            VenueGroup::Aliases(names) => names.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub title: String,
    pub css_file: String,
    pub encoding: String,
    pub show_paper_style: PaperStyle,

    pub journal_shortname_highlighted: Vec<String>,
    pub journal_fullname_highlighted: Vec<String>,
    pub conference_shortname_highlighted: Vec<String>,
    pub author_names_highlighted: Vec<String>,

    pub selection_and: SelectionTable,
    pub selection_or: SelectionTable,

    pub show_count_number: bool,
    pub count_publisher: Vec<VenueGroup>,

    pub show_citation_types: Vec<String>,
    pub show_citation: ShowCitation,
    pub show_total_citation: bool,
    #[serde(rename = "googlescholarID")]
    pub google_scholar_id: String,
    pub show_citation_before_years: i32,
    #[serde(rename = "scholar.js")]
    pub scholar_js: String,

    pub show_page_title: bool,

    pub use_icon: bool,
    pub icon_pdf: String,
    pub icon_www: String,
    pub icon_size: String,

    pub target_link: String,
    pub target_link_citation: String,

    pub single_line: bool,
    pub bulleted_list: BulletedList,

    pub show_abstract: bool,
    pub show_bibtex: bool,
    pub use_bootstrap_dialog: bool,

    pub type_conference_paper: Vec<String>,
    pub type_conference_abstract: Vec<String>,

    pub bibtex_fields_download: Vec<String>,
    pub bibtex_fields_note: Vec<String>,
    pub bibtex_show_list: Vec<String>,

    pub show_author_sign: bool,
    pub author_sign: AuthorSign,

    pub add_blank_line_after_item: bool,
    pub bootstrap_css: String,
}

const DEFAULT_VENUES: &[&[&str]] = &[
    &["Nature Methods"],
    &["TMI", "IEEE Transactions on Medical Imaging"],
    &["MedIA", "MIA", "Medical Image Analysis"],
    &["TPAMI", "IEEE Transactions on Pattern Analysis and Machine Intelligence"],
    &["IJCV", "International Journal of Computer Vision"],
    &["NeuroImage"],
    &["HBM", "Human Brain Mapping"],
    &["TIP", "IEEE Transactions on Image Processing"],
    &["MRM", "Magnetic Resonance in Medicine"],
    &["Medical Physics"],
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: "Publication List".into(),
            css_file: String::new(),
            encoding: "UTF-8".into(),
            show_paper_style: PaperStyle::Type,
            journal_shortname_highlighted: strings(&[
                "TMI", "HBM", "MIA", "MedIA", "TIP", "TPAMI", "IJCV", "MRM",
            ]),
            journal_fullname_highlighted: strings(&[
                "Nature Methods",
                "NeuroImage",
                "Medical Image Analysis",
                "IEEE Transactions on Medical Imaging",
                "IEEE Transactions on Pattern Analysis and Machine Intelligence",
                "Medical Physics",
                "Magnetic Resonance in Medicine",
                "SIAM Journal on Imaging Sciences",
            ]),
            conference_shortname_highlighted: strings(&[
                "MICCAI", "IPMI", "CVPR", "NIPS", "ICCV", "ECCV",
            ]),
            author_names_highlighted: Vec::new(),
            selection_and: SelectionTable::new(),
            selection_or: SelectionTable::new(),
            show_count_number: true,
            count_publisher: DEFAULT_VENUES
                .iter()
                .map(|g| VenueGroup::Aliases(strings(g)))
                .collect(),
            show_citation_types: strings(&["article", "inproceedings", "phdthesis", "inbook"]),
            show_citation: ShowCitation::No,
            show_total_citation: false,
            google_scholar_id: String::new(),
            show_citation_before_years: 1,
            scholar_js: "https://kha.li/dist/scholar/scholar-0.1.1.min.js".into(),
            show_page_title: true,
            use_icon: false,
            icon_pdf: String::new(),
            icon_www: String::new(),
            icon_size: "16px".into(),
            target_link: "_self".into(),
            target_link_citation: "_blank".into(),
            single_line: true,
            bulleted_list: BulletedList::Ol,
            show_abstract: true,
            show_bibtex: true,
            use_bootstrap_dialog: true,
            type_conference_paper: strings(&["inproceedings"]),
            type_conference_abstract: strings(&["conference"]),
            bibtex_fields_download: strings(&[
                "arxiv", "project", "slides", "poster", "video", "code", "software", "data",
                "media",
            ]),
            bibtex_fields_note: strings(&["note", "hlnote", "hlnote2"]),
            bibtex_show_list: strings(&[
                "author",
                "title",
                "journal",
                "booktitle",
                "year",
                "volume",
                "number",
                "pages",
                "month",
                "publisher",
                "organization",
                "school",
                "address",
                "edition",
                "editor",
                "institution",
                "chapter",
                "series",
                "pdf",
                "doi",
                "url",
                "hal_id",
                "eprint",
                "archiveprefix",
                "primaryclass",
            ]),
            show_author_sign: false,
            author_sign: AuthorSign::default(),
            add_blank_line_after_item: false,
            bootstrap_css: "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css"
                .into(),
        }
    }
}

impl Config {
    /// Read the optional configuration file, apply the inline overrides and validate the result.
    pub fn load(path: Option<&Path>, overrides: &[String]) -> anyhow::Result<Config> {
        let mut merged = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                file_options(&text)?
            }
            None => Map::new(),
        };
        for raw in overrides {
            apply_override(&mut merged, raw)?;
        }
        let config = Config::from_options(merged)?;
        config.validate()?;
        Ok(config)
    }

    fn from_options(options: Map<String, Value>) -> Result<Config, ConfigError> {
        serde_json::from_value(Value::Object(options)).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Cross-option checks that the types alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.show_total_citation && self.show_citation != ShowCitation::Scrape {
            return Err(ConfigError::TotalCitationNeedsScrape);
        }
        if self.show_citation == ShowCitation::Scrape && self.google_scholar_id.trim().is_empty() {
            return Err(ConfigError::MissingScholarId);
        }
        if self
            .count_publisher
            .iter()
            .any(|g| matches!(g, VenueGroup::Aliases(a) if a.is_empty()))
        {
            return Err(ConfigError::EmptyVenueGroup);
        }
        self.selector().map(|_| ())
    }

    pub fn selector(&self) -> Result<Selector, ConfigError> {
        Selector::new(&self.selection_and, &self.selection_or)
    }

    pub fn highlights(&self) -> Highlights {
        Highlights {
            journal_shortnames: self.journal_shortname_highlighted.clone(),
            journal_fullnames: self.journal_fullname_highlighted.clone(),
            conference_shortnames: self.conference_shortname_highlighted.clone(),
            authors: self.author_names_highlighted.clone(),
        }
    }

    pub fn type_sets(&self) -> TypeSets {
        TypeSets {
            conference_paper: self.type_conference_paper.clone(),
            conference_abstract: self.type_conference_abstract.clone(),
        }
    }

    /// Groups used for venue counts: the configured journals followed by each highlighted
    /// conference.
    pub fn venue_groups(&self) -> Vec<Vec<String>> {
        self.count_publisher
            .iter()
            .map(VenueGroup::aliases)
            .chain(
                self.conference_shortname_highlighted
                    .iter()
                    .map(|c| vec![c.clone()]),
            )
            .collect()
    }

    /// Citation counts are only shown for entries published up to this year.
    pub fn show_citation_year(&self) -> i32 {
        chrono::Local::now().year() - self.show_citation_before_years
    }
}

/// Options from a TOML file. A `[params]` table is used when present, otherwise the top level.
fn file_options(text: &str) -> Result<Map<String, Value>, ConfigError> {
    let mut table: toml::Table = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let table = match table.remove("params") {
        Some(toml::Value::Table(params)) => params,
        Some(_) => return Err(ConfigError::Parse("`params` must be a table".into())),
        None => table,
    };
    match serde_json::to_value(table).map_err(|e| ConfigError::Parse(e.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::Parse("configuration must be a table".into())),
    }
}

/// Merge one inline JSON object into `options`, replacing keys it names.
fn apply_override(options: &mut Map<String, Value>, raw: &str) -> Result<(), ConfigError> {
    match serde_json::from_str(raw).map_err(|e| ConfigError::Parse(format!("-i {raw}: {e}")))? {
        Value::Object(map) => {
            options.extend(map);
            Ok(())
        }
        _ => Err(ConfigError::Parse(format!("-i {raw}: expected a JSON object"))),
    }
}
