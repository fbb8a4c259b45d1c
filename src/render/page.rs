use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::{classify, config::PaperStyle, entry::Entry, error::RenderError};

use super::Renderer;

/// Where the by-type and by-year pages go. Either may be absent, but not both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFiles {
    pub by_type: Option<PathBuf>,
    pub by_year: Option<PathBuf>,
}

impl OutputFiles {
    /// `type` and `year` write to `html` itself; `type_year` writes `<stem>_by_type<ext>` and
    /// `<stem>_by_year<ext>` next to it.
    pub fn for_style(style: PaperStyle, html: &Path) -> Self {
        let suffixed = |suffix: &str| {
            let stem = html.file_stem().unwrap_or_default().to_string_lossy();
            let ext = html
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            html.with_file_name(format!("{stem}{suffix}{ext}"))
        };
        match style {
            PaperStyle::Type => OutputFiles {
                by_type: Some(html.to_path_buf()),
                by_year: None,
            },
            PaperStyle::Year => OutputFiles {
                by_type: None,
                by_year: Some(html.to_path_buf()),
            },
            PaperStyle::TypeYear => OutputFiles {
                by_type: Some(suffixed("_by_type")),
                by_year: Some(suffixed("_by_year")),
            },
        }
    }
}

fn file_name(path: Option<&Path>) -> String {
    path.and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn nav_link(href: &str, label: &str) -> String {
    format!(
        "<span style=\"font-size: 20px;\"><a href=\"{href}\"><b>{label}</b></a></span> &#8226;&nbsp;"
    )
}

fn section_heading(anchor: &str, title: &str) -> String {
    format!("<h2><a name=\"{anchor}\"></a>{title}</h2>")
}

impl Renderer<'_> {
    /// Entries as one bulleted list, in the order given.
    pub fn entry_list(&self, entries: &[&Entry]) -> Result<String, RenderError> {
        let (open, close) = self.config.bulleted_list.tags();
        let mut out = format!("\n{open}\n");
        for entry in entries {
            out.push_str(&self.entry_html(entry)?);
        }
        out.push_str(&format!("\n{close}\n\n\n"));
        Ok(out)
    }

    /// Entries split into category sections, each sorted newest first.
    pub fn page_by_type(&self, entries: &[&Entry], files: &OutputFiles) -> Result<String, RenderError> {
        let type_file = file_name(files.by_type.as_deref());
        let groups = classify::group(entries, &self.types);

        let mut out = self.prelog();
        out.push_str(&self.header(entries));

        out.push_str("<p><big>&#8226;&nbsp;");
        if files.by_year.is_some() {
            out.push_str(&nav_link(&file_name(files.by_year.as_deref()), "Sorted by year"));
        }
        for (category, _) in &groups {
            out.push_str(&nav_link(
                &format!("{type_file}#{}", category.anchor()),
                category.nav_label(),
            ));
        }
        out.push_str("</big></p>\n\n");

        for (category, mut members) in groups {
            self.comparator.sort_by_year(&mut members);
            out.push_str(&section_heading(&category.anchor(), category.title()));
            out.push_str(&self.entry_list(&members)?);
        }

        out.push_str(&self.afterlog());
        Ok(out)
    }

    /// Entries split into one section per year, latest year first and undated years last.
    pub fn page_by_year(&self, entries: &[&Entry], files: &OutputFiles) -> Result<String, RenderError> {
        let year_file = file_name(files.by_year.as_deref());
        let mut years: Vec<(String, Vec<&Entry>)> = Vec::new();
        for &entry in entries {
            let year = entry.year.to_string();
            match years.iter_mut().find(|(y, _)| *y == year) {
                Some((_, members)) => members.push(entry),
                None => years.push((year, vec![entry])),
            }
        }
        years.sort_by_key(|(_, members)| members[0].year.recency_key());

        let mut out = self.prelog();
        out.push_str(&self.header(entries));

        if !years.is_empty() {
            out.push_str("<p><big>&#8226;&nbsp;");
            if files.by_type.is_some() {
                out.push_str(&nav_link(&file_name(files.by_type.as_deref()), "Sorted by type"));
            }
            for (year, _) in &years {
                out.push_str(&nav_link(&format!("{year_file}#year{year}"), year));
            }
            out.push_str("</big></p>\n\n");

            for (year, mut members) in years {
                self.comparator.sort_by_type(&mut members);
                out.push('\n');
                out.push_str(&section_heading(&format!("year{year}"), &year));
                out.push('\n');
                out.push_str(&self.entry_list(&members)?);
            }
        }

        out.push_str(&self.afterlog());
        Ok(out)
    }

    /// Render every page named in `files` and write it out. Nothing is written when any page
    /// fails to render.
    pub fn write_pages(&self, entries: &[&Entry], files: &OutputFiles) -> anyhow::Result<Vec<PathBuf>> {
        let mut pages = Vec::new();
        if let Some(path) = &files.by_type {
            pages.push((path, self.page_by_type(entries, files)?));
        }
        if let Some(path) = &files.by_year {
            pages.push((path, self.page_by_year(entries, files)?));
        }

        let mut written = Vec::new();
        for (path, html) in pages {
            std::fs::write(path, html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
            written.push(path.clone());
        }
        Ok(written)
    }
}
