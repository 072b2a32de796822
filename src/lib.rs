//! zenity-forms - Build composite input dialogs from the command line.
//!
//! Each widget flag adds one field to a single dialog; the answers come back
//! as one CSV-style line. Message boxes (info, warning, error, question) are
//! shown on their own.

pub mod cli;
pub mod error;
pub mod output;
pub mod ui;
pub(crate) mod backend;
pub(crate) mod render;

pub use error::Error;
pub use ui::form::{FormBuilder, FormResult};
pub use ui::message::MessageBuilder;
pub use ui::{ButtonPreset, Colors, DialogResult, FieldValue, Icon, THEME_DARK, THEME_LIGHT};

/// Creates a new message dialog builder.
///
/// # Example
///
/// ```no_run
/// use zenity_forms::{message, Icon, ButtonPreset};
///
/// let result = message()
///     .title("Information")
///     .text("Operation completed successfully!")
///     .icon(Icon::Info)
///     .buttons(ButtonPreset::Ok)
///     .show()
///     .unwrap();
/// ```
pub fn message() -> MessageBuilder {
    MessageBuilder::new()
}

/// Creates an info dialog (shortcut for message with info icon).
pub fn info(text: &str) -> MessageBuilder {
    MessageBuilder::new()
        .text(text)
        .icon(Icon::Info)
        .buttons(ButtonPreset::Ok)
}

/// Creates a warning dialog (shortcut for message with warning icon).
pub fn warning(text: &str) -> MessageBuilder {
    MessageBuilder::new()
        .text(text)
        .icon(Icon::Warning)
        .buttons(ButtonPreset::Ok)
}

/// Creates an error dialog (shortcut for message with error icon).
pub fn error(text: &str) -> MessageBuilder {
    MessageBuilder::new()
        .text(text)
        .icon(Icon::Error)
        .buttons(ButtonPreset::Ok)
}

/// Creates a question dialog (shortcut for message with question icon and Yes/No buttons).
pub fn question(text: &str) -> MessageBuilder {
    MessageBuilder::new()
        .text(text)
        .icon(Icon::Question)
        .buttons(ButtonPreset::YesNo)
}

/// Creates a new form dialog builder.
///
/// # Example
///
/// ```no_run
/// use zenity_forms::{form, FormResult, cli::ItemSpec};
///
/// let result = form()
///     .title("Profile")
///     .item(ItemSpec::Entry { label: "Name".into() })
///     .item(ItemSpec::Checkbox { label: "Subscribe".into(), checked: true })
///     .show()
///     .unwrap();
/// if let FormResult::Accepted(values) = result {
///     println!("{values:?}");
/// }
/// ```
pub fn form() -> FormBuilder {
    FormBuilder::new()
}
