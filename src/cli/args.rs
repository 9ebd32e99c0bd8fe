//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::config::RawSettings;

/// Generate learning roadmaps with a local Ollama model and show them as trees
#[derive(Parser, Debug)]
#[command(name = "roadmapgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output on stderr (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Inference server base URL
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub base_url: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fail when a node's `children` is not an array
    #[arg(long, global = true, overrides_with = "no_strict")]
    pub strict: bool,

    /// Ignore a non-array `children` even if config enables strict mode
    #[arg(long, global = true, overrides_with = "strict")]
    pub no_strict: bool,

    /// Ask the server for JSON-constrained output
    #[arg(long, global = true, overrides_with = "no_json_format")]
    pub json_format: bool,

    /// Do not send `"format": "json"` even if config enables it
    #[arg(long, global = true, overrides_with = "json_format")]
    pub no_json_format: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings given on the command line; unset flags leave lower layers alone.
    pub fn settings_overrides(&self) -> RawSettings {
        RawSettings {
            base_url: self.base_url.clone(),
            model_name: self.model.clone(),
            request_timeout_secs: self.timeout,
            json_format: switch(self.json_format, self.no_json_format),
            strict_children: switch(self.strict, self.no_strict),
        }
    }
}

/// `--x` / `--no-x` pair; neither given leaves the setting to lower layers.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the model for a roadmap
    Generate {
        /// Prompt words (read from stdin when omitted)
        prompt: Vec<String>,
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Parse a roadmap JSON document
    Parse {
        /// Input file (stdin when omitted or `-`)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        #[command(flatten)]
        render: RenderArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by commands that print a roadmap.
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
    pub format: OutputFormat,

    /// Unwrap a Markdown code fence around the JSON before parsing
    #[arg(long)]
    pub unfence: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Print node count, depth and leaf count to stderr
    #[arg(long)]
    pub stats: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented tree of titles and links
    Tree,
    /// Pretty-printed roadmap JSON
    Json,
    /// The document text exactly as received
    Raw,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create global config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unset(&[], None)]
    #[case::on(&["--strict"], Some(true))]
    #[case::off(&["--no-strict"], Some(false))]
    #[case::last_wins(&["--strict", "--no-strict"], Some(false))]
    fn given_strict_flags_when_building_overrides_then_maps_to_setting(
        #[case] flags: &[&str],
        #[case] expected: Option<bool>,
    ) {
        let args = ["roadmapgen"].iter().chain(flags).chain(&["config", "show"]);
        let cli = Cli::try_parse_from(args).expect("valid args");
        assert_eq!(cli.settings_overrides().strict_children, expected);
    }

    #[test]
    fn given_no_json_format_flag_when_building_overrides_then_disables_it() {
        let cli = Cli::try_parse_from(["roadmapgen", "parse", "--no-json-format"]).unwrap();
        assert_eq!(cli.settings_overrides().json_format, Some(false));
        assert_eq!(cli.settings_overrides().strict_children, None);
    }
}
