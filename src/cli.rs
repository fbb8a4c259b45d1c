use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Configuration file (TOML, optionally under a [params] table)
    #[arg(short, long = "conf", value_name = "CONFFILE", global = true)]
    pub conf: Option<PathBuf>,

    /// JSON object overriding configuration options, e.g. '{"show_paper_style": "year"}'.
    /// May be repeated; later objects win.
    #[arg(short, long = "input", value_name = "JSON", global = true)]
    pub input: Vec<String>,

    /// More output per occurrence (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a bibliography into an HTML publication list
    Render {
        #[arg(value_name = "BIBFILE")]
        bib: PathBuf,
        /// Output page. With show_paper_style = "type_year" this names two files,
        /// <stem>_by_type<ext> and <stem>_by_year<ext>.
        #[arg(value_name = "HTMLFILE")]
        html: PathBuf,
        /// Also write the cleaned and selected entries as BibTeX
        #[arg(long, value_name = "OUTBIB")]
        outbib: Option<PathBuf>,
    },
    /// Build a static site with one page per year, category, author and venue
    Site {
        #[arg(value_name = "BIBFILE")]
        bib: PathBuf,
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

impl Command {
    pub fn bib(&self) -> &Path {
        match self {
            Command::Render { bib, .. } | Command::Site { bib, .. } => bib,
        }
    }
}

impl GlobalArgs {
    /// Log filter used when RUST_LOG is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
