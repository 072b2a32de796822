//! Result-line formatting.

use std::borrow::Cow;

use crate::{
    cli::{ItemSpec, MessageKind},
    ui::{DialogResult, FieldValue},
};

/// Quotes `text` when it contains a comma, quote, or line break, doubling
/// embedded quotes.
pub fn csv_escape(text: &str) -> Cow<'_, str> {
    if !text.contains([',', '"', '\n', '\r']) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
}

/// Lower-cased label with spaces turned into underscores, escaped.
pub fn simple_key(label: &str) -> String {
    csv_escape(&label.to_lowercase().replace(' ', "_")).into_owned()
}

/// Builds the output line (without the trailing newline) for an accepted form.
///
/// `values` lines up with `items`. Widgets without a value print nothing.
pub fn format_line(items: &[ItemSpec], values: &[Option<FieldValue>], debug: bool) -> String {
    items
        .iter()
        .zip(values)
        .filter_map(|(item, value)| token(item, value.as_ref()?, debug))
        .collect::<Vec<_>>()
        .join(",")
}

fn token(item: &ItemSpec, value: &FieldValue, debug: bool) -> Option<String> {
    let keyed = |label: &str, value: &str| {
        if debug {
            format!("{}={value}", csv_escape(label))
        } else {
            value.to_string()
        }
    };

    let token = match (item, value) {
        (ItemSpec::Entry { .. }, FieldValue::Text(text)) => format!("input={}", csv_escape(text)),
        (ItemSpec::Calendar { .. }, FieldValue::Date(date)) => {
            format!("calendar={}", date.format("%Y-%m-%d"))
        }
        (ItemSpec::Checkbox { label, .. }, FieldValue::Bool(checked)) => {
            let key = if debug {
                csv_escape(label).into_owned()
            } else {
                simple_key(label)
            };
            format!("{key}={checked}")
        }
        (ItemSpec::List { .. }, FieldValue::Choice(Some(choice))) => {
            keyed("list", &csv_escape(choice))
        }
        (ItemSpec::Slider(range) | ItemSpec::Dial(range), FieldValue::Int(n)) => {
            keyed(&range.label, &n.to_string())
        }
        (ItemSpec::DateTime { label }, FieldValue::DateTime(at)) => {
            keyed(label, &at.format("%Y-%m-%dT%H:%M:%S").to_string())
        }
        (ItemSpec::Radio { label, .. }, FieldValue::Choice(Some(option))) => {
            keyed(label, &csv_escape(option))
        }
        _ => return None,
    };
    Some(token)
}

/// Reply word and exit code for a finished message box.
///
/// Informational boxes always answer `OK`, however they were dismissed.
pub fn message_reply(kind: MessageKind, result: DialogResult) -> (&'static str, i32) {
    match (kind, result) {
        (MessageKind::Question, DialogResult::Button(0)) => ("Yes", 0),
        (MessageKind::Question, _) => ("No", 1),
        _ => ("OK", 0),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::cli::{MediaSpec, RangeSpec};

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(csv_escape("hello world"), "hello world");
        assert!(matches!(csv_escape("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_escape("cr\r"), "\"cr\r\"");
    }

    #[test]
    fn simple_keys() {
        assert_eq!(simple_key("Dark Mode"), "dark_mode");
        assert_eq!(simple_key("A, B"), "\"a,_b\"");
    }

    fn sample() -> (Vec<ItemSpec>, Vec<Option<FieldValue>>) {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let items = vec![
            ItemSpec::Entry {
                label: "Name".into(),
            },
            ItemSpec::Checkbox {
                label: "Dark Mode".into(),
                checked: false,
            },
            ItemSpec::Calendar {
                label: "When".into(),
            },
            ItemSpec::Slider(RangeSpec::new("Volume", 0, 100, 50)),
            ItemSpec::Image(MediaSpec {
                path: "x.png".into(),
                size: None,
            }),
            ItemSpec::DateTime {
                label: "At".into(),
            },
            ItemSpec::Radio {
                label: "Color".into(),
                options: vec!["red".into()],
            },
            ItemSpec::List {
                title: "Pick".into(),
                items: vec!["a,b".into()],
            },
            ItemSpec::Clock,
        ];
        let values = vec![
            Some(FieldValue::Text("Ann, Lee".into())),
            Some(FieldValue::Bool(true)),
            Some(FieldValue::Date(date)),
            Some(FieldValue::Int(42)),
            None,
            Some(FieldValue::DateTime(date.and_hms_opt(9, 5, 0).unwrap())),
            Some(FieldValue::Choice(Some("red".into()))),
            Some(FieldValue::Choice(Some("a,b".into()))),
            None,
        ];
        (items, values)
    }

    #[test]
    fn line_without_debug() {
        let (items, values) = sample();
        assert_eq!(
            format_line(&items, &values, false),
            "input=\"Ann, Lee\",dark_mode=true,calendar=2024-05-17,42,2024-05-17T09:05:00,red,\"a,b\""
        );
    }

    #[test]
    fn line_with_debug_labels() {
        let (items, values) = sample();
        assert_eq!(
            format_line(&items, &values, true),
            "input=\"Ann, Lee\",Dark Mode=true,calendar=2024-05-17,Volume=42,At=2024-05-17T09:05:00,Color=red,list=\"a,b\""
        );
    }

    #[test]
    fn debug_keys_are_escaped() {
        let items = vec![ItemSpec::Dial(RangeSpec::new("x,y", 0, 10, 3))];
        let values = vec![Some(FieldValue::Int(3))];
        assert_eq!(format_line(&items, &values, true), "\"x,y\"=3");
    }

    #[test]
    fn message_replies() {
        assert_eq!(message_reply(MessageKind::Info, DialogResult::Closed), ("OK", 0));
        assert_eq!(message_reply(MessageKind::Error, DialogResult::Button(0)), ("OK", 0));
        assert_eq!(message_reply(MessageKind::Question, DialogResult::Button(0)), ("Yes", 0));
        assert_eq!(message_reply(MessageKind::Question, DialogResult::Button(1)), ("No", 1));
        assert_eq!(message_reply(MessageKind::Question, DialogResult::Closed), ("No", 1));
    }

    #[test]
    fn no_output_widgets_give_empty_line() {
        let items = vec![ItemSpec::Clock];
        assert_eq!(format_line(&items, &[None], false), "");
    }
}
