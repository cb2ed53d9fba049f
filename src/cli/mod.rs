use crate::app::{IntentParseError, RenderDiff, SessionController, parse_intent_line};
use crate::domain::{IndependentTimelineRule, SyncMode, format_clock};
use crate::infra::{ConfigError, WallConfig, WallConfigOverrides};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui { overrides: WallConfigOverrides },
    Command {
        command: CliCommand,
        overrides: WallConfigOverrides,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    Segments,
    /// `source: None` reads the script from stdin.
    Replay { source: Option<PathBuf>, json: bool },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut overrides = WallConfigOverrides::default();
    let mut subcommand: Option<String> = None;
    let mut positionals: Vec<String> = Vec::new();
    let mut json = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cells" | "-c" => {
                let value = flag_value(&mut iter, "--cells")?;
                overrides.cell_count = Some(parse_number_flag("--cells", value)?);
            }
            "--segments" => {
                let value = flag_value(&mut iter, "--segments")?;
                overrides.segment_count = Some(parse_number_flag("--segments", value)?);
            }
            "--hours" => {
                let value = flag_value(&mut iter, "--hours")?;
                overrides.total_hours = Some(parse_number_flag("--hours", value)?);
            }
            "--default-position" => {
                let value = flag_value(&mut iter, "--default-position")?;
                overrides.default_archive_position =
                    Some(parse_number_flag("--default-position", value)?);
            }
            "--sync" => {
                let value = flag_value(&mut iter, "--sync")?;
                let mode = SyncMode::parse(value).ok_or_else(|| invalid("--sync", value))?;
                overrides.sync_mode = Some(mode);
            }
            "--timeline-rule" => {
                let value = flag_value(&mut iter, "--timeline-rule")?;
                let rule = IndependentTimelineRule::parse(value)
                    .ok_or_else(|| invalid("--timeline-rule", value))?;
                overrides.independent_timeline_rule = Some(rule);
            }
            "--json" => {
                json = true;
            }
            // A lone dash names stdin for `replay`.
            "-" => positionals.push(arg.to_string()),
            _ if arg.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(arg.to_string()));
            }
            _ if subcommand.is_none() => subcommand = Some(arg.to_string()),
            _ => positionals.push(arg.to_string()),
        }
    }

    let Some(subcommand) = subcommand else {
        if json {
            return Err(CliParseError::UnknownFlag("--json".to_string()));
        }
        if let Some(extra) = positionals.into_iter().next() {
            return Err(CliParseError::UnexpectedArgument(extra));
        }
        return Ok(CliInvocation::Tui { overrides });
    };

    let command = match subcommand.as_str() {
        "segments" => {
            if json {
                return Err(CliParseError::UnknownFlag("--json".to_string()));
            }
            if let Some(extra) = positionals.into_iter().next() {
                return Err(CliParseError::UnexpectedArgument(extra));
            }
            CliCommand::Segments
        }
        "replay" => {
            let mut positionals = positionals.into_iter();
            let source = positionals
                .next()
                .filter(|value| value != "-")
                .map(PathBuf::from);
            if let Some(extra) = positionals.next() {
                return Err(CliParseError::UnexpectedArgument(extra));
            }
            CliCommand::Replay { source, json }
        }
        other => return Err(CliParseError::UnknownSubcommand(other.to_string())),
    };

    Ok(CliInvocation::Command { command, overrides })
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("invalid wall config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("failed to open script {path}: {source}")]
    OpenScript { path: PathBuf, source: io::Error },

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Read(#[from] io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: IntentParseError,
    },

    #[error("failed to encode render event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Counts reported at the end of a replay.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
}

pub fn run(command: CliCommand, config: WallConfig) -> Result<(), CliRunError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let stderr = io::stderr();
    let mut err = io::BufWriter::new(stderr.lock());

    match command {
        CliCommand::Segments => {
            let timeline = config.timeline()?;
            for segment in timeline.segments() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    segment.index,
                    format_clock(segment.start_seconds),
                    format_clock(segment.end_seconds),
                    format_clock(segment.midpoint_seconds)
                )?;
            }
        }
        CliCommand::Replay { source, json } => {
            let mut controller = SessionController::new(config)?;
            let summary = match source {
                Some(path) => {
                    let file = File::open(&path).map_err(|source| CliRunError::OpenScript {
                        path: path.clone(),
                        source,
                    })?;
                    replay_script(&mut controller, BufReader::new(file), &mut out, &mut err, json)?
                }
                None => {
                    let stdin = io::stdin();
                    replay_script(&mut controller, stdin.lock(), &mut out, &mut err, json)?
                }
            };
            log::info!(
                "replay finished: {} applied, {} rejected",
                summary.applied,
                summary.rejected
            );
        }
    }

    out.flush()?;
    err.flush()?;
    Ok(())
}

/// Feeds each scripted intent to the controller. Render events go to `out`; rejected intents are
/// reported on `err` and leave the wall unchanged. A malformed line stops the replay.
pub fn replay_script<R: BufRead, W: Write, E: Write>(
    controller: &mut SessionController,
    reader: R,
    out: &mut W,
    err: &mut E,
    json: bool,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();
    write_diff(out, &controller.full_render(), json)?;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let intent = parse_intent_line(&line).map_err(|source| ReplayError::Parse {
            line: line_number,
            source,
        })?;
        let Some(intent) = intent else {
            continue;
        };

        match controller.dispatch(intent) {
            Ok(diff) => {
                summary.applied += 1;
                write_diff(out, &diff, json)?;
            }
            Err(error) => {
                summary.rejected += 1;
                writeln!(err, "line {line_number}: rejected: {error}")?;
            }
        }
    }

    Ok(summary)
}

fn write_diff<W: Write>(out: &mut W, diff: &RenderDiff, json: bool) -> Result<(), ReplayError> {
    for event in &diff.events {
        if json {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{event}")?;
        }
    }
    Ok(())
}

fn flag_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<&'a str, CliParseError> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| CliParseError::MissingFlagValue(flag.to_string()))
}

fn parse_number_flag<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, CliParseError> {
    value.parse::<T>().map_err(|_| invalid(flag, value))
}

fn invalid(flag: &str, value: &str) -> CliParseError {
    CliParseError::InvalidFlagValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}
