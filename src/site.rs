//! Group mode: a small static site with one page per year, category, author and venue.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::{
    classify,
    count::publisher_shortname,
    entry::Entry,
    error::RenderError,
    render::{Renderer, page::nav_link},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Year,
    Category,
    Author,
    Venue,
}

impl Section {
    const ALL: [Section; 4] = [
        Section::Year,
        Section::Category,
        Section::Author,
        Section::Venue,
    ];

    fn dir(self) -> &'static str {
        match self {
            Section::Year => "year",
            Section::Category => "category",
            Section::Author => "author",
            Section::Venue => "venue",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Section::Year => "By year",
            Section::Category => "By category",
            Section::Author => "By author",
            Section::Venue => "By venue",
        }
    }
}

/// One page of the site other than the index.
#[derive(Debug)]
pub struct GroupPage<'a> {
    pub section: Section,
    pub title: String,
    /// Path relative to the site root.
    pub path: PathBuf,
    pub entries: Vec<&'a Entry>,
}

/// File-name-safe form of `name`: lowercase letters and digits separated by single dashes.
pub fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        "undated".to_string()
    } else {
        out
    }
}

fn pages_for<'a>(
    section: Section,
    keyed: impl IntoIterator<Item = (String, String, &'a Entry)>,
) -> Vec<GroupPage<'a>> {
    // slug -> page; the first spelling seen becomes the title
    let mut pages: BTreeMap<String, GroupPage<'a>> = BTreeMap::new();
    for (slug, title, entry) in keyed {
        let page = pages.entry(slug.clone()).or_insert_with(|| GroupPage {
            section,
            title,
            path: Path::new(section.dir()).join(format!("{slug}.html")),
            entries: Vec::new(),
        });
        if !page.entries.iter().any(|e| std::ptr::eq(*e, entry)) {
            page.entries.push(entry);
        }
    }
    pages.into_values().collect()
}

/// Every group page, in write order: years (latest first, undated last), categories, authors,
/// venues.
pub fn plan<'a>(renderer: &Renderer<'_>, entries: &[&'a Entry]) -> Vec<GroupPage<'a>> {
    let mut out = Vec::new();

    let mut years = pages_for(
        Section::Year,
        entries.iter().map(|&e| {
            let year = e.year.to_string();
            (slug(&year), if year.is_empty() { "Undated".into() } else { year }, e)
        }),
    );
    years.sort_by_key(|p| p.entries[0].year.recency_key());
    out.extend(years);

    for (category, members) in classify::group(entries, renderer.types()) {
        out.push(GroupPage {
            section: Section::Category,
            title: category.title().to_string(),
            path: Path::new(Section::Category.dir()).join(format!("{}.html", category.anchor())),
            entries: members,
        });
    }

    out.extend(pages_for(
        Section::Author,
        entries.iter().flat_map(|&e| {
            e.authors()
                .into_iter()
                .filter(|a| !a.is_empty())
                .map(move |a| (slug(a), a.to_string(), e))
        }),
    ));

    out.extend(pages_for(
        Section::Venue,
        entries.iter().filter_map(|&e| {
            let venue = publisher_shortname(e);
            (!venue.is_empty()).then(|| (slug(venue), venue.to_string(), e))
        }),
    ));

    out
}

fn index_html(renderer: &Renderer<'_>, entries: &[&Entry], pages: &[GroupPage<'_>]) -> String {
    let mut out = renderer.prelog();
    out.push_str(&renderer.header(entries));
    for section in Section::ALL {
        let links: String = pages
            .iter()
            .filter(|p| p.section == section)
            .map(|p| nav_link(&href(&p.path), &p.title))
            .collect();
        if links.is_empty() {
            continue;
        }
        out.push_str(&format!(
            "<h2>{}</h2>\n<p><big>&#8226;&nbsp;{links}</big></p>\n\n",
            section.heading()
        ));
    }
    out.push_str(&renderer.afterlog());
    out
}

fn group_html(renderer: &Renderer<'_>, page: &GroupPage<'_>) -> Result<String, RenderError> {
    let mut members = page.entries.clone();
    renderer.comparator().sort_by_year(&mut members);

    let config = renderer.config();
    let mut out = renderer.prelog_titled(&format!("{} - {}", page.title, config.title));
    out.push_str(&format!(
        "<p>{}</p>\n\n<h1>{}</h1>\n\n",
        nav_link("../index.html", &config.title),
        page.title
    ));
    out.push_str(&renderer.entry_list(&members)?);
    out.push_str(&renderer.afterlog());
    Ok(out)
}

fn href(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render the whole site into `dir`. Every page is rendered before the first one is written.
pub fn build(renderer: &Renderer<'_>, entries: &[&Entry], dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pages = plan(renderer, entries);

    let mut rendered = vec![(PathBuf::from("index.html"), index_html(renderer, entries, &pages))];
    for page in &pages {
        debug!(page = %page.path.display(), entries = page.entries.len(), "rendering group page");
        rendered.push((page.path.clone(), group_html(renderer, page)?));
    }

    let bar = ProgressBar::new(rendered.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg}\n{wide_bar:.cyan/blue} {pos}/{len}")
            .unwrap()
            .progress_chars("█  "),
    );
    bar.set_message(format!("writing site to {}", dir.display()));

    let mut written = Vec::new();
    for (relative, html) in rendered {
        let path = dir.join(&relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;
        bar.inc(1);
        written.push(path);
    }
    bar.finish_and_clear();
    info!("wrote {} pages to {}", written.len(), dir.display());
    Ok(written)
}
