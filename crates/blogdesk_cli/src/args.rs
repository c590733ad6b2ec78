//! Command-line parsing.

use crate::config::ConfigFlags;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const USAGE: &str = "usage: blogdesk [--db PATH | --memory] [--out DIR] [--log-dir ABS_DIR] [--log-level LEVEL] <command>

commands:
  ping                  check core linkage
  save <draft.json>     validate and store an article
  publish <draft.json>  store an article and write its HTML page
  list                  list stored articles, newest first
  show <id>             print one article as JSON
  render <id>           print the HTML page of one article
  delete <id>           delete one article
  search <keyword>      search title, content, category and tags
  export                write all articles as a JSON bundle";

/// One CLI action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Save(PathBuf),
    Publish(PathBuf),
    List,
    Show(String),
    Render(String),
    Delete(String),
    Search(String),
    Export,
    Help,
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub flags: ConfigFlags,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue(&'static str),
    MissingCommand,
    UnknownCommand(String),
    UnknownFlag(String),
    UnexpectedArgument(String),
}

impl Display for ArgsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingValue(name) => write!(f, "missing value for `{name}`"),
            Self::MissingCommand => write!(f, "missing command"),
            Self::UnknownCommand(name) => write!(f, "unknown command `{name}`"),
            Self::UnknownFlag(name) => write!(f, "unknown flag `{name}`"),
            Self::UnexpectedArgument(value) => write!(f, "unexpected argument `{value}`"),
        }
    }
}

impl Error for ArgsError {}

/// Parses arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut flags = ConfigFlags::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => flags.db = Some(PathBuf::from(take_value(&mut args, "--db")?)),
            "--out" => flags.out_dir = Some(PathBuf::from(take_value(&mut args, "--out")?)),
            "--log-dir" => {
                flags.log_dir = Some(PathBuf::from(take_value(&mut args, "--log-dir")?))
            }
            "--log-level" => flags.log_level = Some(take_value(&mut args, "--log-level")?),
            "--memory" => flags.memory = true,
            "-h" | "--help" => positional.push("help".to_string()),
            other if other.starts_with("--") => {
                return Err(ArgsError::UnknownFlag(other.to_string()))
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let name = positional.next().ok_or(ArgsError::MissingCommand)?;
    let command = match name.as_str() {
        "ping" => Command::Ping,
        "help" => Command::Help,
        "list" => Command::List,
        "export" => Command::Export,
        "save" => Command::Save(PathBuf::from(take_value(&mut positional, "save")?)),
        "publish" => Command::Publish(PathBuf::from(take_value(&mut positional, "publish")?)),
        "show" => Command::Show(take_value(&mut positional, "show")?),
        "render" => Command::Render(take_value(&mut positional, "render")?),
        "delete" => Command::Delete(take_value(&mut positional, "delete")?),
        // A missing keyword searches for everything.
        "search" => Command::Search(positional.next().unwrap_or_default()),
        other => return Err(ArgsError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = positional.next() {
        return Err(ArgsError::UnexpectedArgument(extra));
    }

    Ok(CliArgs { flags, command })
}

fn take_value<I>(args: &mut I, name: &'static str) -> Result<String, ArgsError>
where
    I: Iterator<Item = String>,
{
    args.next().ok_or(ArgsError::MissingValue(name))
}

#[cfg(test)]
mod tests {
    use super::{parse_args, ArgsError, Command};
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Result<super::CliArgs, ArgsError> {
        parse_args(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_flags_around_command() {
        let parsed = parse(&["--db", "a.db", "publish", "post.json", "--out", "www"]).unwrap();
        assert_eq!(parsed.command, Command::Publish(PathBuf::from("post.json")));
        assert_eq!(parsed.flags.db, Some(PathBuf::from("a.db")));
        assert_eq!(parsed.flags.out_dir, Some(PathBuf::from("www")));
    }

    #[test]
    fn search_without_keyword_is_empty_search() {
        let parsed = parse(&["--memory", "search"]).unwrap();
        assert_eq!(parsed.command, Command::Search(String::new()));
        assert!(parsed.flags.memory);
    }

    #[test]
    fn reports_missing_and_unknown_inputs() {
        assert_eq!(parse(&[]).unwrap_err(), ArgsError::MissingCommand);
        assert_eq!(parse(&["show"]).unwrap_err(), ArgsError::MissingValue("show"));
        assert_eq!(
            parse(&["--db"]).unwrap_err(),
            ArgsError::MissingValue("--db")
        );
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err(),
            ArgsError::UnknownCommand("frobnicate".to_string())
        );
        assert_eq!(
            parse(&["list", "extra"]).unwrap_err(),
            ArgsError::UnexpectedArgument("extra".to_string())
        );
    }
}
