//! Command-line parsing.
//!
//! Turns argv into a [`Command`]. Widget flags keep their command-line order;
//! message flags win over everything else.

use std::{collections::HashMap, ffi::OsString, path::PathBuf};

use lexopt::prelude::*;
use thiserror::Error;

use crate::ui::{ButtonPreset, Icon};

/// Window title of the composite dialog when `--title` is absent.
pub const DEFAULT_FORM_TITLE: &str = "Input Dialog";

pub const HELP: &str = "\
Usage: zenity-forms [OPTIONS]

Message boxes (the first one given wins, in this order):
  --info <text>                  Information box, prints OK
  --warning <text>               Warning box, prints OK
  --error <text>                 Error box, prints OK
  --question <text>              Yes/No box, prints Yes or No

Form widgets (combined into one dialog, in command-line order):
  --entry <label>                Single-line text input
  --checkbox <label>             Checkbox
  --checked                      Check the most recent --checkbox
  --multi-checkbox <a,b,...>     One checkbox per label
  --list <title>                 Single-selection list, filled by --items
  --items <a,b,...>              Items of the matching --list
  --calendar <label>             Month calendar
  --slider <label,min,max,def>   Horizontal slider
  --dial <label,min,max,def>     Rotary dial
  --datetime <label>             Date and time editor
  --radio <label,opt,opt,...>    Radio group; repeat a label to add options
  --image <path[,w,h]>           Static picture
  --movie <path[,w,h]>           Animated picture
  --clock                        Live HH:MM:SS clock

Options:
  --title <text>                 Window title
  --window-size <w,h>            Dialog size in logical pixels
  --debug                        Label every output value; verbose logging
  -h, --help                     Print this help
  --version                      Print version

Exit status: 0 accepted, 1 cancelled or closed, 2 usage error, 100 runtime failure.
";

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("--items required for --list {0:?}")]
    MissingItems(String),
    #[error("--{flag} expects {expected} comma-separated fields, got {got}")]
    Arity {
        flag: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("no valid dialog type specified, use --help")]
    NoDialog,
    #[error(transparent)]
    Lexopt(#[from] lexopt::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Message(MessageRequest),
    Form(FormRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
    Question,
}

impl MessageKind {
    const PRECEDENCE: [MessageKind; 4] = [
        MessageKind::Info,
        MessageKind::Warning,
        MessageKind::Error,
        MessageKind::Question,
    ];

    pub fn default_title(self) -> &'static str {
        match self {
            MessageKind::Info => "Information",
            MessageKind::Warning => "Warning",
            MessageKind::Error => "Error",
            MessageKind::Question => "Question",
        }
    }

    pub fn icon(self) -> Icon {
        match self {
            MessageKind::Info => Icon::Info,
            MessageKind::Warning => Icon::Warning,
            MessageKind::Error => Icon::Error,
            MessageKind::Question => Icon::Question,
        }
    }

    pub fn buttons(self) -> ButtonPreset {
        match self {
            MessageKind::Question => ButtonPreset::YesNo,
            _ => ButtonPreset::Ok,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRequest {
    pub kind: MessageKind,
    pub text: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub title: String,
    pub items: Vec<ItemSpec>,
    /// Logical size; a zero dimension keeps the computed one.
    pub window_size: Option<(u32, u32)>,
    pub debug: bool,
}

/// One requested widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSpec {
    Entry { label: String },
    Checkbox { label: String, checked: bool },
    List { title: String, items: Vec<String> },
    Calendar { label: String },
    Slider(RangeSpec),
    Dial(RangeSpec),
    DateTime { label: String },
    Radio { label: String, options: Vec<String> },
    Image(MediaSpec),
    Movie(MediaSpec),
    Clock,
}

/// Largest logical width or height accepted for the window or a picture.
pub const MAX_DIMENSION: u32 = 4096;

/// Integer range of a slider or dial, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub label: String,
    pub min: i64,
    pub max: i64,
    pub value: i64,
}

impl RangeSpec {
    /// A `max` below `min` becomes `min`; `value` is clamped into range.
    pub fn new(label: impl Into<String>, min: i64, max: i64, value: i64) -> Self {
        let max = max.max(min);
        Self {
            label: label.into(),
            min,
            max,
            value: value.clamp(min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSpec {
    pub path: PathBuf,
    pub size: Option<(u32, u32)>,
}

/// Parses the process arguments, without the program name.
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut parser = lexopt::Parser::from_args(args);

    let mut title: Option<String> = None;
    let mut messages: [Option<String>; 4] = Default::default();
    let mut items: Vec<ItemSpec> = Vec::new();
    let mut window_size = None;
    let mut debug = false;

    // Lists are filled from --items after the whole command line is seen.
    let mut lists: Vec<usize> = Vec::new();
    let mut item_sets: Vec<Vec<String>> = Vec::new();
    let mut radios: HashMap<String, usize> = HashMap::new();
    let mut last_checkbox: Option<usize> = None;
    let mut pending_checked = false;
    // Widget mistakes only matter when no message box wins.
    let mut widget_error: Option<UsageError> = None;

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => return Ok(Command::Help),
            Long("version") => return Ok(Command::Version),

            Long("info") => messages[MessageKind::Info.index()] = Some(parser.value()?.string()?),
            Long("warning") => {
                messages[MessageKind::Warning.index()] = Some(parser.value()?.string()?)
            }
            Long("error") => messages[MessageKind::Error.index()] = Some(parser.value()?.string()?),
            Long("question") => {
                messages[MessageKind::Question.index()] = Some(parser.value()?.string()?)
            }

            Long("title") => title = Some(parser.value()?.string()?),
            Long("debug") => debug = true,
            Long("window-size") => {
                let spec = parser.value()?.string()?;
                match split_fields(&spec).as_slice() {
                    [w, h] => window_size = Some((parse_dimension(w), parse_dimension(h))),
                    fields => defer(&mut widget_error, arity("window-size", "2", fields.len())),
                }
            }

            Long("entry") => items.push(ItemSpec::Entry {
                label: parser.value()?.string()?,
            }),
            Long("checkbox") => {
                last_checkbox = Some(items.len());
                items.push(ItemSpec::Checkbox {
                    label: parser.value()?.string()?,
                    checked: std::mem::take(&mut pending_checked),
                });
            }
            Long("checked") => match last_checkbox.and_then(|i| items.get_mut(i)) {
                Some(ItemSpec::Checkbox { checked, .. }) => *checked = true,
                _ => pending_checked = true,
            },
            Long("multi-checkbox") => {
                let spec = parser.value()?.string()?;
                items.extend(split_fields(&spec).into_iter().map(|label| ItemSpec::Checkbox {
                    label: label.to_string(),
                    checked: false,
                }));
            }
            Long("list") => {
                lists.push(items.len());
                items.push(ItemSpec::List {
                    title: parser.value()?.string()?,
                    items: Vec::new(),
                });
            }
            Long("items") => {
                let spec = parser.value()?.string()?;
                item_sets.push(split_fields(&spec).into_iter().map(str::to_string).collect());
            }
            Long("calendar") => items.push(ItemSpec::Calendar {
                label: parser.value()?.string()?,
            }),
            Long("slider") => {
                let spec = parser.value()?.string()?;
                match parse_range("slider", &spec) {
                    Ok(range) => items.push(ItemSpec::Slider(range)),
                    Err(e) => defer(&mut widget_error, e),
                }
            }
            Long("dial") => {
                let spec = parser.value()?.string()?;
                match parse_range("dial", &spec) {
                    Ok(range) => items.push(ItemSpec::Dial(range)),
                    Err(e) => defer(&mut widget_error, e),
                }
            }
            Long("datetime") => items.push(ItemSpec::DateTime {
                label: parser.value()?.string()?,
            }),
            Long("radio") => {
                let spec = parser.value()?.string()?;
                let fields = split_fields(&spec);
                if fields.len() < 2 {
                    defer(&mut widget_error, arity("radio", "at least 2", fields.len()));
                    continue;
                }
                let label = fields[0].to_string();
                let new_options = fields[1..].iter().map(|o| o.to_string());
                match radios.get(&label).and_then(|&i| items.get_mut(i)) {
                    Some(ItemSpec::Radio { options, .. }) => options.extend(new_options),
                    _ => {
                        radios.insert(label.clone(), items.len());
                        items.push(ItemSpec::Radio {
                            label,
                            options: new_options.collect(),
                        });
                    }
                }
            }
            Long("image") => {
                let spec = parser.value()?.string()?;
                match parse_media("image", &spec) {
                    Ok(media) => items.push(ItemSpec::Image(media)),
                    Err(e) => defer(&mut widget_error, e),
                }
            }
            Long("movie") => {
                let spec = parser.value()?.string()?;
                match parse_media("movie", &spec) {
                    Ok(media) => items.push(ItemSpec::Movie(media)),
                    Err(e) => defer(&mut widget_error, e),
                }
            }
            Long("clock") => items.push(ItemSpec::Clock),

            _ => return Err(arg.unexpected().into()),
        }
    }

    if pending_checked {
        tracing::warn!("--checked given without a --checkbox, ignoring");
    }

    for (n, &index) in lists.iter().enumerate() {
        let Some(ItemSpec::List { title, items: list }) = items.get_mut(index) else {
            continue;
        };
        match item_sets.get_mut(n) {
            Some(set) => *list = std::mem::take(set),
            None => defer(&mut widget_error, UsageError::MissingItems(title.clone())),
        }
    }
    if item_sets.len() > lists.len() {
        tracing::warn!(
            extra = item_sets.len() - lists.len(),
            "--items without a matching --list, ignoring"
        );
    }

    // Message boxes take precedence over any form widgets.
    for kind in MessageKind::PRECEDENCE {
        if let Some(text) = messages[kind.index()].take() {
            if !items.is_empty() {
                tracing::debug!(?kind, widgets = items.len(), "message box overrides form widgets");
            }
            return Ok(Command::Message(MessageRequest {
                kind,
                title: title.unwrap_or_else(|| kind.default_title().to_string()),
                text,
            }));
        }
    }

    if let Some(e) = widget_error {
        return Err(e);
    }
    if items.is_empty() {
        return Err(UsageError::NoDialog);
    }

    Ok(Command::Form(FormRequest {
        title: title.unwrap_or_else(|| DEFAULT_FORM_TITLE.to_string()),
        items,
        window_size,
        debug,
    }))
}

/// Keeps the first widget error seen.
fn defer(slot: &mut Option<UsageError>, error: UsageError) {
    slot.get_or_insert(error);
}

fn arity(flag: &'static str, expected: &'static str, got: usize) -> UsageError {
    UsageError::Arity {
        flag,
        expected,
        got,
    }
}

/// Splits on commas and trims each field.
fn split_fields(spec: &str) -> Vec<&str> {
    spec.split(',').map(str::trim).collect()
}

/// Lenient integer parsing: anything that is not a number reads as zero.
pub fn parse_int(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

/// Non-negative size, capped at [`MAX_DIMENSION`].
fn parse_dimension(text: &str) -> u32 {
    parse_int(text).clamp(0, MAX_DIMENSION as i64) as u32
}

fn parse_range(flag: &'static str, spec: &str) -> Result<RangeSpec, UsageError> {
    match split_fields(spec).as_slice() {
        [label, min, max, value] => Ok(RangeSpec::new(
            *label,
            parse_int(min),
            parse_int(max),
            parse_int(value),
        )),
        fields => Err(arity(flag, "4", fields.len())),
    }
}

fn parse_media(flag: &'static str, spec: &str) -> Result<MediaSpec, UsageError> {
    match split_fields(spec).as_slice() {
        [path] => Ok(MediaSpec {
            path: PathBuf::from(path),
            size: None,
        }),
        [path, w, h] => Ok(MediaSpec {
            path: PathBuf::from(path),
            size: Some((parse_dimension(w), parse_dimension(h))),
        }),
        fields => Err(arity(flag, "1 or 3", fields.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().copied())
    }

    fn form(args: &[&str]) -> FormRequest {
        match parse(args) {
            Ok(Command::Form(form)) => form,
            other => panic!("expected a form, got {other:?}"),
        }
    }

    #[test]
    fn no_flags_is_a_usage_error() {
        assert!(matches!(parse(&[]), Err(UsageError::NoDialog)));
        assert!(matches!(parse(&["--debug"]), Err(UsageError::NoDialog)));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(matches!(parse(&["--bogus"]), Err(UsageError::Lexopt(_))));
        assert!(matches!(parse(&["stray"]), Err(UsageError::Lexopt(_))));
        assert!(matches!(parse(&["--entry"]), Err(UsageError::Lexopt(_))));
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["--help", "--bogus"]).unwrap(), Command::Help);
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["--version"]).unwrap(), Command::Version);
    }

    #[test]
    fn message_precedence() {
        let cmd = parse(&["--question", "q", "--warning", "w", "--entry", "e"]).unwrap();
        assert_eq!(
            cmd,
            Command::Message(MessageRequest {
                kind: MessageKind::Warning,
                text: "w".into(),
                title: "Warning".into(),
            })
        );
    }

    #[test]
    fn message_uses_custom_title() {
        let Command::Message(msg) = parse(&["--title", "Hey", "--info=done"]).unwrap() else {
            panic!("expected a message");
        };
        assert_eq!((msg.title.as_str(), msg.text.as_str()), ("Hey", "done"));
        assert_eq!(msg.kind.buttons(), ButtonPreset::Ok);
        assert_eq!(MessageKind::Question.buttons(), ButtonPreset::YesNo);
    }

    #[test]
    fn widgets_keep_command_line_order() {
        let f = form(&["--calendar", "When", "--entry", "Name", "--clock"]);
        assert_eq!(
            f.items,
            vec![
                ItemSpec::Calendar {
                    label: "When".into()
                },
                ItemSpec::Entry {
                    label: "Name".into()
                },
                ItemSpec::Clock,
            ]
        );
        assert_eq!(f.title, DEFAULT_FORM_TITLE);
        assert!(!f.debug);
    }

    #[test]
    fn multi_checkbox_expands_and_trims() {
        let f = form(&["--multi-checkbox", "Red, Dark Blue ,green"]);
        let labels: Vec<_> = f
            .items
            .iter()
            .map(|i| match i {
                ItemSpec::Checkbox { label, checked } => {
                    assert!(!checked);
                    label.as_str()
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(labels, ["Red", "Dark Blue", "green"]);
    }

    #[test]
    fn checked_applies_to_latest_checkbox() {
        let f = form(&["--checkbox", "a", "--checkbox", "b", "--checked"]);
        assert_eq!(
            f.items,
            vec![
                ItemSpec::Checkbox {
                    label: "a".into(),
                    checked: false
                },
                ItemSpec::Checkbox {
                    label: "b".into(),
                    checked: true
                },
            ]
        );
    }

    #[test]
    fn checked_before_checkbox_applies_to_next() {
        let f = form(&["--checked", "--checkbox", "a"]);
        assert_eq!(
            f.items,
            vec![ItemSpec::Checkbox {
                label: "a".into(),
                checked: true
            }]
        );
    }

    #[test]
    fn lists_pair_with_items_in_order() {
        let f = form(&["--items", "x, y", "--list", "First", "--list", "Second", "--items", "z"]);
        assert_eq!(
            f.items,
            vec![
                ItemSpec::List {
                    title: "First".into(),
                    items: vec!["x".into(), "y".into()]
                },
                ItemSpec::List {
                    title: "Second".into(),
                    items: vec!["z".into()]
                },
            ]
        );
    }

    #[test]
    fn list_without_items_is_a_usage_error() {
        let err = parse(&["--list", "Pick"]).unwrap_err();
        assert!(matches!(err, UsageError::MissingItems(ref t) if t == "Pick"));
        assert!(matches!(
            parse(&["--list", "A", "--items", "a", "--list", "B"]),
            Err(UsageError::MissingItems(_))
        ));
    }

    #[test]
    fn message_wins_over_malformed_widgets() {
        for args in [
            &["--info", "hi", "--list", "Pick"][..],
            &["--slider", "a,1", "--info", "hi"],
            &["--info", "hi", "--radio", "Lonely", "--image", "a,b"],
            &["--window-size", "9", "--info", "hi"],
        ] {
            assert!(
                matches!(parse(args), Ok(Command::Message(MessageRequest { kind: MessageKind::Info, .. }))),
                "{args:?}"
            );
        }
    }

    #[test]
    fn first_widget_error_is_reported() {
        assert!(matches!(
            parse(&["--slider", "a,1", "--list", "Pick"]),
            Err(UsageError::Arity { flag: "slider", .. })
        ));
    }

    #[test]
    fn oversized_dimensions_are_capped() {
        let f = form(&["--entry", "e", "--window-size", "600000000,1"]);
        assert_eq!(f.window_size, Some((MAX_DIMENSION, 1)));
        let f = form(&["--image", "a.png,99999999,20"]);
        assert_eq!(
            f.items,
            vec![ItemSpec::Image(MediaSpec {
                path: "a.png".into(),
                size: Some((MAX_DIMENSION, 20))
            })]
        );
    }

    #[test]
    fn slider_fields_are_normalized() {
        let f = form(&["--slider", "Volume, 0, 100, 250", "--dial", "Knob,10,5,7"]);
        assert_eq!(
            f.items,
            vec![
                ItemSpec::Slider(RangeSpec::new("Volume", 0, 100, 100)),
                ItemSpec::Dial(RangeSpec::new("Knob", 10, 10, 10)),
            ]
        );
    }

    #[test]
    fn non_numeric_fields_become_zero() {
        let f = form(&["--slider", "S,low,high,mid"]);
        assert_eq!(f.items, vec![ItemSpec::Slider(RangeSpec::new("S", 0, 0, 0))]);
        assert_eq!(parse_int(" -42 "), -42);
        assert_eq!(parse_int("4.5"), 0);
    }

    #[test]
    fn range_arity_is_checked() {
        let err = parse(&["--slider", "a,1,2"]).unwrap_err();
        assert!(matches!(
            err,
            UsageError::Arity {
                flag: "slider",
                got: 3,
                ..
            }
        ));
        assert!(matches!(
            parse(&["--dial", "a,1,2,3,4"]),
            Err(UsageError::Arity { flag: "dial", .. })
        ));
    }

    #[test]
    fn window_size_needs_two_fields() {
        let f = form(&["--entry", "e", "--window-size", "640, 480"]);
        assert_eq!(f.window_size, Some((640, 480)));
        let f = form(&["--entry", "e", "--window-size", "-5,x"]);
        assert_eq!(f.window_size, Some((0, 0)));
        assert!(matches!(
            parse(&["--entry", "e", "--window-size", "640"]),
            Err(UsageError::Arity { flag: "window-size", .. })
        ));
    }

    #[test]
    fn radio_groups_merge_by_label() {
        let f = form(&["--radio", "Color,red,green", "--entry", "e", "--radio", "Color, blue"]);
        assert_eq!(
            f.items[0],
            ItemSpec::Radio {
                label: "Color".into(),
                options: vec!["red".into(), "green".into(), "blue".into()],
            }
        );
        assert_eq!(f.items.len(), 2);
        assert!(matches!(
            parse(&["--radio", "Lonely"]),
            Err(UsageError::Arity { flag: "radio", .. })
        ));
    }

    #[test]
    fn media_with_and_without_size() {
        let f = form(&["--image", "/tmp/a.png", "--movie", "/tmp/b.gif,120,0"]);
        assert_eq!(
            f.items,
            vec![
                ItemSpec::Image(MediaSpec {
                    path: "/tmp/a.png".into(),
                    size: None
                }),
                ItemSpec::Movie(MediaSpec {
                    path: "/tmp/b.gif".into(),
                    size: Some((120, 0))
                }),
            ]
        );
        assert!(matches!(
            parse(&["--image", "a.png,10"]),
            Err(UsageError::Arity { flag: "image", .. })
        ));
    }

    #[test]
    fn debug_can_be_a_label() {
        let f = form(&["--entry", "--debug"]);
        assert!(!f.debug);
        assert_eq!(f.items, vec![ItemSpec::Entry { label: "--debug".into() }]);
    }

    #[test]
    fn debug_and_title_are_recorded() {
        let f = form(&["--debug", "--title", "Setup", "--datetime", "When"]);
        assert!(f.debug);
        assert_eq!(f.title, "Setup");
    }
}
