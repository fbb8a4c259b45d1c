use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    citation::{CitationSource, ScholarProfile},
    cli::{Cli, Command},
    config::{Config, ShowCitation},
    entry::Entry,
    render::{OutputFiles, Renderer},
};

mod bibliography;
mod citation;
mod classify;
mod cli;
mod compare;
mod config;
mod count;
mod entry;
mod error;
mod normalize;
mod render;
mod select;
mod site;

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bib2html={level}")),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn summary(ok: usize, failed: usize) {
    let color = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    if color {
        eprintln!("{} {} {} {}", "✓".green().bold(), ok, "✗".red().bold(), failed);
    } else {
        eprintln!("✓ {ok} ✗ {failed}");
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.global.log_level());

    let config = Config::load(args.global.conf.as_deref(), &args.global.input)?;
    debug!(?config, "configuration");
    let selector = config.selector()?;

    let bib_path = args.command.bib();
    let text = std::fs::read_to_string(bib_path)
        .with_context(|| format!("failed to read {}", bib_path.display()))?;
    let parsed = bibliography::parse(&text)?;

    let mut entries: Vec<Entry> = Vec::with_capacity(parsed.entries.len());
    for mut entry in parsed.entries {
        debug!(?entry, "before cleaning");
        normalize::normalize(&mut entry);
        debug!(?entry, "after cleaning");
        if selector.is_selected(&entry) {
            entries.push(entry);
        }
    }
    let selected: Vec<&Entry> = entries.iter().collect();
    info!("{} entries selected from {}", selected.len(), bib_path.display());

    let citations = match config.show_citation {
        ShowCitation::Scrape => Some(ScholarProfile::default().fetch(&config.google_scholar_id)?),
        _ => None,
    };
    let renderer = Renderer::new(&config, citations.as_ref());

    match &args.command {
        Command::Render { html, outbib, .. } => {
            let files = OutputFiles::for_style(config.show_paper_style, html);
            renderer.write_pages(&selected, &files)?;
            if let Some(outbib) = outbib {
                let document = bibliography::to_bibtex_document(&selected, &config.bibtex_show_list);
                std::fs::write(outbib, document)
                    .with_context(|| format!("failed to write {}", outbib.display()))?;
                info!("wrote cleaned entries to {}", outbib.display());
            }
        }
        Command::Site { dir, .. } => {
            site::build(&renderer, &selected, dir)?;
        }
    }

    summary(selected.len(), parsed.skipped);
    Ok(())
}
