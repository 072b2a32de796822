//! UI components and dialog implementations.

pub mod form;
pub(crate) mod media;
pub mod message;
pub(crate) mod widgets;

use chrono::{NaiveDate, NaiveDateTime};

use crate::render::{Rgba, rgb};

/// Color theme for dialogs.
#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub window_bg: Rgba,
    pub text: Rgba,
    pub button: Rgba,
    pub button_hover: Rgba,
    pub button_pressed: Rgba,
    pub button_outline: Rgba,
    pub button_text: Rgba,
    pub input_bg: Rgba,
    pub input_bg_focused: Rgba,
    pub input_border: Rgba,
    pub input_border_focused: Rgba,
    pub input_placeholder: Rgba,
    pub accent: Rgba,
    pub muted_text: Rgba,
    pub window_border: Rgba,
    pub window_shadow: Rgba,
}

/// Light theme colors.
pub static THEME_LIGHT: Colors = Colors {
    window_bg: rgb(250, 250, 250),
    text: rgb(30, 30, 30),
    button: rgb(230, 230, 230),
    button_hover: rgb(220, 220, 220),
    button_pressed: rgb(200, 200, 200),
    button_outline: rgb(180, 180, 180),
    button_text: rgb(30, 30, 30),
    input_bg: rgb(255, 255, 255),
    input_bg_focused: rgb(255, 255, 255),
    input_border: rgb(200, 200, 200),
    input_border_focused: rgb(100, 150, 200),
    input_placeholder: rgb(150, 150, 150),
    accent: rgb(70, 140, 220),
    muted_text: rgb(120, 120, 120),
    window_border: rgb(180, 180, 180),
    window_shadow: Rgba::new(0, 0, 0, 50),
};

/// Dark theme colors.
pub static THEME_DARK: Colors = Colors {
    window_bg: rgb(45, 45, 45),
    text: rgb(230, 230, 230),
    button: rgb(70, 70, 70),
    button_hover: rgb(80, 80, 80),
    button_pressed: rgb(60, 60, 60),
    button_outline: rgb(100, 100, 100),
    button_text: rgb(230, 230, 230),
    input_bg: rgb(60, 60, 60),
    input_bg_focused: rgb(65, 65, 65),
    input_border: rgb(90, 90, 90),
    input_border_focused: rgb(100, 150, 200),
    input_placeholder: rgb(120, 120, 120),
    accent: rgb(70, 140, 220),
    muted_text: rgb(150, 150, 150),
    window_border: rgb(70, 70, 70),
    window_shadow: Rgba::new(0, 0, 0, 80),
};

/// Picks light or dark colours from `GTK_THEME`, then the GNOME
/// `color-scheme` setting. Dark when neither says anything.
pub fn detect_theme() -> &'static Colors {
    let gtk_theme = std::env::var("GTK_THEME").ok();
    let color_scheme = || {
        std::process::Command::new("gsettings")
            .args(["get", "org.gnome.desktop.interface", "color-scheme"])
            .output()
            .ok()
            .map(|out| String::from_utf8_lossy(&out.stdout).into_owned())
    };
    let colors = match gtk_theme {
        Some(name) => theme_for(Some(&name), None),
        None => theme_for(None, color_scheme().as_deref()),
    };
    tracing::debug!(dark = std::ptr::eq(colors, &THEME_DARK), "theme selected");
    colors
}

fn theme_for(gtk_theme: Option<&str>, color_scheme: Option<&str>) -> &'static Colors {
    if let Some(name) = gtk_theme {
        return if name.to_lowercase().contains("dark") {
            &THEME_DARK
        } else {
            &THEME_LIGHT
        };
    }
    match color_scheme {
        Some(s) if s.contains("dark") => &THEME_DARK,
        Some(s) if s.contains("light") || s.contains("default") => &THEME_LIGHT,
        _ => &THEME_DARK,
    }
}

/// Icon types for message dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Info,
    Warning,
    Error,
    Question,
}

/// Button presets for message dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPreset {
    Ok,
    OkCancel,
    YesNo,
}

impl ButtonPreset {
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            ButtonPreset::Ok => &["OK"],
            ButtonPreset::OkCancel => &["OK", "Cancel"],
            ButtonPreset::YesNo => &["Yes", "No"],
        }
    }
}

/// Dialog result indicating which button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResult {
    Button(usize),
    Closed,
}

impl DialogResult {
    /// First button accepts, anything else (including closing the window) declines.
    pub fn exit_code(self) -> i32 {
        match self {
            DialogResult::Button(0) => 0,
            DialogResult::Button(_) | DialogResult::Closed => 1,
        }
    }
}

/// Final state of one form widget, read after the dialog is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Selected entry of a list or radio group, if any.
    Choice(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_exit_codes() {
        assert_eq!(DialogResult::Button(0).exit_code(), 0);
        assert_eq!(DialogResult::Button(1).exit_code(), 1);
        assert_eq!(DialogResult::Closed.exit_code(), 1);
    }

    #[test]
    fn gtk_theme_wins_over_gsettings() {
        assert!(std::ptr::eq(theme_for(Some("Adwaita:dark"), Some("'prefer-light'")), &THEME_DARK));
        assert!(std::ptr::eq(theme_for(Some("Adwaita"), Some("'prefer-dark'")), &THEME_LIGHT));
    }

    #[test]
    fn color_scheme_fallback() {
        assert!(std::ptr::eq(theme_for(None, Some("'prefer-dark'\n")), &THEME_DARK));
        assert!(std::ptr::eq(theme_for(None, Some("'default'\n")), &THEME_LIGHT));
        assert!(std::ptr::eq(theme_for(None, None), &THEME_DARK));
    }

    #[test]
    fn yes_no_labels() {
        assert_eq!(ButtonPreset::YesNo.labels(), &["Yes", "No"]);
    }
}
