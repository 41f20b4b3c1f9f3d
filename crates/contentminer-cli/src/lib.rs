//! Command handling for the `contentminer` binary.
//!
//! Reads a raw analysis file or a backend response body, runs the parser and
//! renders `{"sections", "kpis"}` as pretty JSON.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use contentminer_core::{DocumentType, MarkdownBlocks, ParseOptions};
use contentminer_parse::{decode_payload, decode_response, DocumentParser, ParseInput, ParsedResult};
use tracing::info;

pub const USAGE: &str = "\
ContentMiner — parse AI analysis text into sections and KPIs

Usage: contentminer <command> [options]

Commands:
  parse <file>          Parse a raw text file
  response <file.json>  Parse a backend response body
  help                  Show this message

Options:
  --channel             Use the fixed channel layout (response: force channel)
  --video               response only: force the video summary shape
  --no-reflow           Keep dense sentences as written
  --no-anchors          Leave m:ss timestamps as plain text
  --unwrap-markdown     Keep the body of MARKDOWN side blocks
  --options <file>      Read parse options from a JSON file

Environment:
  CONTENTMINER_DOCUMENT_TYPE, CONTENTMINER_REFLOW, CONTENTMINER_ANCHORS,
  CONTENTMINER_DUPLICATE_IDS, CONTENTMINER_UNWRAP_MARKDOWN, RUST_LOG";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Parse { file: PathBuf, flags: Flags },
    Response { file: PathBuf, flags: Flags },
    Help,
}

/// Option flags shared by both commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub channel: bool,
    pub video: bool,
    pub no_reflow: bool,
    pub no_anchors: bool,
    pub unwrap_markdown: bool,
    pub options_file: Option<PathBuf>,
}

impl Flags {
    /// Options file (if any), then environment, then command-line flags.
    pub fn resolve_options(&self) -> ParseOptions {
        let base = match &self.options_file {
            Some(path) => ParseOptions::load(path),
            None => ParseOptions::default(),
        };
        let mut options = base.with_env_overrides();
        if self.channel {
            options.document_type = DocumentType::FixedChannel;
        }
        if self.video {
            options.document_type = DocumentType::Generic;
        }
        if self.no_reflow {
            options.reflow_bullets = false;
        }
        if self.no_anchors {
            options.anchor_timestamps = false;
        }
        if self.unwrap_markdown {
            options.markdown_blocks = MarkdownBlocks::Unwrap;
        }
        options
    }
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };
    match command.as_str() {
        "--help" | "-h" | "help" => Ok(Command::Help),
        "parse" | "response" => {
            let mut file = None;
            let mut flags = Flags::default();
            let mut rest = args[1..].iter();
            while let Some(arg) = rest.next() {
                match arg.as_str() {
                    "--channel" => flags.channel = true,
                    "--video" => flags.video = true,
                    "--no-reflow" => flags.no_reflow = true,
                    "--no-anchors" => flags.no_anchors = true,
                    "--unwrap-markdown" => flags.unwrap_markdown = true,
                    "--options" => {
                        let path = rest.next().context("--options needs a file path")?;
                        flags.options_file = Some(PathBuf::from(path));
                    }
                    other if other.starts_with("--") => bail!("unknown option: {other}"),
                    other => {
                        if file.replace(PathBuf::from(other)).is_some() {
                            bail!("only one input file is accepted");
                        }
                    }
                }
            }
            if flags.channel && flags.video {
                bail!("--channel and --video are mutually exclusive");
            }
            let file = file.with_context(|| format!("usage: contentminer {command} <file>"))?;
            if command == "parse" {
                Ok(Command::Parse { file, flags })
            } else {
                Ok(Command::Response { file, flags })
            }
        }
        other => bail!("unknown command: {other} (try `contentminer help`)"),
    }
}

/// Execute a command and return what should be printed.
pub fn run(args: &[String]) -> anyhow::Result<String> {
    match parse_args(args)? {
        Command::Help => Ok(USAGE.to_string()),
        Command::Parse { file, flags } => {
            let options = flags.resolve_options();
            let raw_text = read_input(&file)?;
            let result = DocumentParser::new(options).parse(&ParseInput::from_text(raw_text));
            render(&result)
        }
        Command::Response { file, flags } => {
            let body = read_input(&file)?;
            let mut options = flags.resolve_options();
            let input = if flags.channel || flags.video {
                decode_response(&body, options.document_type)
            } else {
                decode_payload(&body).map(|payload| {
                    options.document_type = payload.document_type();
                    payload.into_input()
                })
            }
            .with_context(|| format!("decoding response body {}", file.display()))?;
            info!("Decoded {} response from {}", options.document_type, file.display());
            let result = DocumentParser::new(options).parse(&input);
            render(&result)
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Pretty JSON with the two top-level keys consumers read.
pub fn render(result: &ParsedResult) -> anyhow::Result<String> {
    let value = serde_json::json!({
        "sections": result.sections,
        "kpis": result.kpis,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse_args(&[]).unwrap(), Command::Help);
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_flags() {
        let cmd = parse_args(&args(&["parse", "a.txt", "--channel", "--no-anchors"])).unwrap();
        match cmd {
            Command::Parse { file, flags } => {
                assert_eq!(file, PathBuf::from("a.txt"));
                assert!(flags.channel);
                assert!(flags.no_anchors);
                assert!(!flags.no_reflow);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bad_args() {
        assert!(parse_args(&args(&["parse"])).is_err());
        assert!(parse_args(&args(&["parse", "a", "b"])).is_err());
        assert!(parse_args(&args(&["parse", "a", "--bogus"])).is_err());
        assert!(parse_args(&args(&["response", "a", "--channel", "--video"])).is_err());
        assert!(parse_args(&args(&["explode"])).is_err());
        assert!(parse_args(&args(&["parse", "a", "--options"])).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let flags = Flags {
            channel: true,
            no_reflow: true,
            unwrap_markdown: true,
            ..Flags::default()
        };
        let options = flags.resolve_options();
        assert_eq!(options.document_type, DocumentType::FixedChannel);
        assert!(!options.reflow_bullets);
        assert_eq!(options.markdown_blocks, MarkdownBlocks::Unwrap);
    }
}
