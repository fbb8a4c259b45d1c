//! Citation counts from a Google Scholar profile.
//!
//! The counts are looked up once, before anything is rendered, and handed to the renderer as an
//! immutable [`CitationTable`]. A failed lookup is an error; there is no partial fallback.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use scraper::{ElementRef, Html, Selector};
use tracing::info;
use url::Url;

const SCHOLAR_CITATIONS: &str = "https://scholar.google.com/citations";

/// Anything that can produce citation counts for a profile.
pub trait CitationSource {
    fn fetch(&self, profile_id: &str) -> anyhow::Result<CitationTable>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Citation {
    pub count: String,
    pub link: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CitationTable {
    /// Keyed by lowercase title.
    pub by_title: HashMap<String, Citation>,
    pub total: String,
    pub h_index: String,
    pub profile_url: String,
}

impl CitationTable {
    pub fn lookup(&self, title: &str) -> Option<&Citation> {
        self.by_title.get(&title.to_lowercase())
    }

    /// The "Total Citations / H-Index" line shown under the page title.
    pub fn summary_html(&self, target: &str) -> String {
        format!(
            "<p><big>&#8226;&nbsp;<b>Total Citations</b>: <a target=\"{target}\" href='{url}'>{total}</a> &#8226;&nbsp;  <b>H-Index</b>: <a target=\"{target}\" href='{url}'>{h}</a></big></p>",
            url = self.profile_url,
            total = self.total,
            h = self.h_index,
        )
    }
}

/// Scrapes the public Google Scholar profile page.
pub struct ScholarProfile {
    agent: ureq::Agent,
}

impl Default for ScholarProfile {
    fn default() -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(std::time::Duration::from_secs(10)))
            .timeout_global(Some(std::time::Duration::from_secs(30)))
            .build();
        ScholarProfile {
            agent: ureq::Agent::new_with_config(cfg),
        }
    }
}

impl CitationSource for ScholarProfile {
    fn fetch(&self, profile_id: &str) -> anyhow::Result<CitationTable> {
        let profile = profile_url(profile_id)?;
        let mut list = profile.clone();
        list.query_pairs_mut()
            .append_pair("view_op", "list_works")
            .append_pair("sortby", "pubdate")
            .append_pair("cstart", "0")
            .append_pair("pagesize", "1000");

        info!("fetching citation counts from {list}");
        let body: String = self
            .agent
            .get(list.as_str())
            .header(
                "User-Agent",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.10 Safari/605.1.1",
            )
            .call()
            .with_context(|| format!("failed to fetch Google Scholar profile {profile_id}"))?
            .into_body()
            .read_to_string()
            .context("failed to read Google Scholar response body")?;

        parse_profile(&body, profile.as_str())
    }
}

pub fn profile_url(profile_id: &str) -> anyhow::Result<Url> {
    let id = profile_id.trim().trim_matches(['\'', '"']);
    if id.is_empty() {
        return Err(anyhow!("no googlescholarID"));
    }
    Ok(Url::parse_with_params(SCHOLAR_CITATIONS, &[("user", id), ("hl", "en")])?)
}

fn selector(css: &'static str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("bad selector {css}: {e:?}"))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Extract per-title counts and the profile totals from a profile page.
pub fn parse_profile(html: &str, profile_url: &str) -> anyhow::Result<CitationTable> {
    let doc = Html::parse_document(html);
    let row_sel = selector("tr.gsc_a_tr")?;
    let title_sel = selector("a.gsc_a_at")?;
    let count_sel = selector("a.gsc_a_ac")?;
    let stat_sel = selector("td.gsc_rsb_std")?;

    let mut by_title = HashMap::new();
    for row in doc.select(&row_sel) {
        let Some(title) = row.select(&title_sel).next() else {
            continue;
        };
        let count = row
            .select(&count_sel)
            .next()
            .map(text_of)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "0".to_string());
        let link = format!(
            "https://scholar.google.com/{}",
            title
                .value()
                .attr("data-href")
                .unwrap_or_default()
                .trim_start_matches('/')
        );
        by_title.insert(text_of(title).to_lowercase(), Citation { count, link });
    }

    let stats: Vec<String> = doc.select(&stat_sel).map(text_of).collect();
    let (Some(total), Some(h_index)) = (stats.first(), stats.get(2)) else {
        return Err(anyhow!(
            "unexpected Google Scholar page: citation totals not found"
        ));
    };

    Ok(CitationTable {
        by_title,
        total: total.clone(),
        h_index: h_index.clone(),
        profile_url: profile_url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r##"<html><body>
<table id="gsc_rsb_st"><tbody>
<tr><td class="gsc_rsb_sc1">Citations</td><td class="gsc_rsb_std">1234</td><td class="gsc_rsb_std">567</td></tr>
<tr><td class="gsc_rsb_sc1">h-index</td><td class="gsc_rsb_std">21</td><td class="gsc_rsb_std">14</td></tr>
</tbody></table>
<table id="gsc_a_t"><tbody>
<tr class="gsc_a_tr"><td class="gsc_a_t"><a class="gsc_a_at" data-href="/citations?view_op=view_citation&amp;citation_for_view=X:1">A Study of Things</a></td>
<td class="gsc_a_c"><a class="gsc_a_ac" href="#">42</a></td></tr>
<tr class="gsc_a_tr"><td class="gsc_a_t"><a class="gsc_a_at" data-href="/citations?citation_for_view=X:2">Uncited Work</a></td>
<td class="gsc_a_c"><a class="gsc_a_ac" href="#"></a></td></tr>
</tbody></table>
</body></html>"##;

    #[test]
    fn parses_counts_and_totals() {
        let table = parse_profile(PROFILE, "https://scholar.google.com/citations?user=X").unwrap();
        assert_eq!(table.total, "1234");
        assert_eq!(table.h_index, "21");
        let hit = table.lookup("a study of THINGS").expect("title present");
        assert_eq!(hit.count, "42");
        assert_eq!(
            hit.link,
            "https://scholar.google.com/citations?view_op=view_citation&citation_for_view=X:1"
        );
        assert_eq!(table.lookup("Uncited Work").map(|c| c.count.as_str()), Some("0"));
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    fn page_without_totals_is_an_error() {
        assert!(parse_profile("<html></html>", "u").is_err());
    }

    #[test]
    fn profile_url_requires_an_id() {
        assert!(profile_url("  ").is_err());
        let url = profile_url("'BARqXQ0AAAAJ'").unwrap();
        assert_eq!(
            url.as_str(),
            "https://scholar.google.com/citations?user=BARqXQ0AAAAJ&hl=en"
        );
    }

    #[test]
    fn summary_line_links_the_profile() {
        let table = CitationTable {
            total: "10".into(),
            h_index: "2".into(),
            profile_url: "P".into(),
            ..CitationTable::default()
        };
        let html = table.summary_html("_blank");
        assert!(html.contains("<a target=\"_blank\" href='P'>10</a>"));
        assert!(html.contains("<b>H-Index</b>: <a target=\"_blank\" href='P'>2</a>"));
    }
}
