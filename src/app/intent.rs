use crate::domain::{CellId, SyncMode};
use thiserror::Error;

/// Everything the wall can be asked to do. Input handlers translate clicks and keys into one of
/// these and hand it to [`super::SessionController::dispatch`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Intent {
    SelectCell { cell_id: CellId },
    CellGoLive { cell_id: CellId },
    CellGoArchive { cell_id: CellId },
    TimelineActivate { segment_index: usize },
    /// A click at an arbitrary point of the timeline, in seconds from its start.
    TimelineActivateAt { seconds: i64 },
    GlobalGoLive,
    ToggleSync { mode: SyncMode },
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum IntentParseError {
    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    #[error("missing argument for {0}")]
    MissingArgument(String),

    #[error("invalid argument for {intent}: {value}")]
    InvalidArgument { intent: String, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

/// Parses one line of an intent script. Blank lines and `#` comments yield `Ok(None)`.
///
/// ```text
/// select 2
/// archive 2
/// segment 5
/// seek 4000
/// live 2
/// go-live
/// sync independent
/// ```
pub fn parse_intent_line(line: &str) -> Result<Option<Intent>, IntentParseError> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if let Some(extra) = words.next() {
        return Err(IntentParseError::UnexpectedArgument(extra.to_string()));
    }

    let intent = match verb {
        "select" => Intent::SelectCell {
            cell_id: parse_cell_id(verb, argument)?,
        },
        "live" => Intent::CellGoLive {
            cell_id: parse_cell_id(verb, argument)?,
        },
        "archive" => Intent::CellGoArchive {
            cell_id: parse_cell_id(verb, argument)?,
        },
        "segment" => Intent::TimelineActivate {
            segment_index: parse_number(verb, argument)?,
        },
        "seek" => Intent::TimelineActivateAt {
            seconds: parse_number(verb, argument)?,
        },
        "go-live" => {
            if let Some(argument) = argument {
                return Err(IntentParseError::UnexpectedArgument(argument.to_string()));
            }
            Intent::GlobalGoLive
        }
        "sync" => {
            let value = required(verb, argument)?;
            let mode = SyncMode::parse(value).ok_or_else(|| IntentParseError::InvalidArgument {
                intent: verb.to_string(),
                value: value.to_string(),
            })?;
            Intent::ToggleSync { mode }
        }
        _ => return Err(IntentParseError::UnknownIntent(verb.to_string())),
    };

    Ok(Some(intent))
}

fn required<'a>(verb: &str, argument: Option<&'a str>) -> Result<&'a str, IntentParseError> {
    argument.ok_or_else(|| IntentParseError::MissingArgument(verb.to_string()))
}

fn parse_number<T: std::str::FromStr>(
    verb: &str,
    argument: Option<&str>,
) -> Result<T, IntentParseError> {
    let value = required(verb, argument)?;
    value
        .parse::<T>()
        .map_err(|_| IntentParseError::InvalidArgument {
            intent: verb.to_string(),
            value: value.to_string(),
        })
}

fn parse_cell_id(verb: &str, argument: Option<&str>) -> Result<CellId, IntentParseError> {
    parse_number::<u32>(verb, argument).map(CellId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_intent() {
        let cases = [
            ("select 2", Intent::SelectCell { cell_id: CellId::new(2) }),
            ("live 1", Intent::CellGoLive { cell_id: CellId::new(1) }),
            ("archive 3", Intent::CellGoArchive { cell_id: CellId::new(3) }),
            ("segment 5", Intent::TimelineActivate { segment_index: 5 }),
            ("seek -20", Intent::TimelineActivateAt { seconds: -20 }),
            ("go-live", Intent::GlobalGoLive),
            (
                "sync independent",
                Intent::ToggleSync {
                    mode: SyncMode::Independent,
                },
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(parse_intent_line(line), Ok(Some(expected)), "{line}");
        }
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        assert_eq!(parse_intent_line(""), Ok(None));
        assert_eq!(parse_intent_line("   # just a note"), Ok(None));
        assert_eq!(
            parse_intent_line("segment 0 # first block"),
            Ok(Some(Intent::TimelineActivate { segment_index: 0 }))
        );
    }

    #[test]
    fn reports_malformed_lines() {
        assert_eq!(
            parse_intent_line("zoom 2"),
            Err(IntentParseError::UnknownIntent("zoom".to_string()))
        );
        assert_eq!(
            parse_intent_line("select"),
            Err(IntentParseError::MissingArgument("select".to_string()))
        );
        assert_eq!(
            parse_intent_line("select two"),
            Err(IntentParseError::InvalidArgument {
                intent: "select".to_string(),
                value: "two".to_string()
            })
        );
        assert_eq!(
            parse_intent_line("go-live now"),
            Err(IntentParseError::UnexpectedArgument("now".to_string()))
        );
        assert_eq!(
            parse_intent_line("segment 1 2"),
            Err(IntentParseError::UnexpectedArgument("2".to_string()))
        );
    }
}
