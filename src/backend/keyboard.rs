//! Keycode translation shared by both backends.

use kbvm::{GroupIndex, Keycode, ModifierMask, lookup::LookupTable};

use super::{KeyEvent, Modifiers, WindowEvent};

/// Result of looking a keycode up in the active layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Translated {
    pub keysym: u32,
    pub text: Option<char>,
}

pub(crate) fn translate(
    table: &LookupTable,
    group: u32,
    mods: ModifierMask,
    keycode: Keycode,
) -> Translated {
    let lookup = table.lookup(GroupIndex(group), mods, keycode);
    let keysym = lookup
        .clone()
        .into_iter()
        .next()
        .map(|p| p.keysym().0)
        .unwrap_or(0);
    let text = lookup.into_iter().find_map(|p| p.char());
    Translated { keysym, text }
}

pub(crate) fn modifiers(mask: ModifierMask) -> Modifiers {
    [
        (ModifierMask::SHIFT, Modifiers::SHIFT),
        (ModifierMask::CONTROL, Modifiers::CTRL),
        (ModifierMask::MOD1, Modifiers::ALT),
        (ModifierMask::MOD4, Modifiers::SUPER),
    ]
    .into_iter()
    .filter(|(bit, _)| mask.contains(*bit))
    .fold(Modifiers::empty(), |acc, (_, flag)| acc | flag)
}

/// Escape closes the dialog unless a chord modifier is held.
pub(crate) fn is_close_chord(keysym: u32, mods: Modifiers) -> bool {
    keysym == super::keys::ESCAPE && !mods.intersects(Modifiers::SHIFT | Modifiers::CTRL | Modifiers::ALT)
}

/// Turns a key press into text input when it produces a printable character,
/// otherwise into a raw key event.
pub(crate) fn press_event(key: Translated, mods: Modifiers) -> WindowEvent {
    if is_close_chord(key.keysym, mods) {
        return WindowEvent::CloseRequested;
    }
    match key.text {
        Some(c) if !c.is_control() && !mods.contains(Modifiers::CTRL) => WindowEvent::TextInput(c),
        _ => WindowEvent::KeyPress(KeyEvent {
            keysym: key.keysym,
            modifiers: mods,
        }),
    }
}

pub(crate) fn release_event(key: Translated, mods: Modifiers) -> WindowEvent {
    WindowEvent::KeyRelease(KeyEvent {
        keysym: key.keysym,
        modifiers: mods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::keys;

    fn key(keysym: u32, text: Option<char>) -> Translated {
        Translated { keysym, text }
    }

    #[test]
    fn printable_press_becomes_text() {
        let ev = press_event(key(0x61, Some('a')), Modifiers::SHIFT);
        assert!(matches!(ev, WindowEvent::TextInput('a')));
    }

    #[test]
    fn ctrl_chord_stays_a_key() {
        let ev = press_event(key(0x61, Some('a')), Modifiers::CTRL);
        assert!(matches!(ev, WindowEvent::KeyPress(KeyEvent { keysym: 0x61, .. })));
    }

    #[test]
    fn control_characters_are_keys() {
        let ev = press_event(key(keys::RETURN, Some('\r')), Modifiers::empty());
        assert!(matches!(ev, WindowEvent::KeyPress(KeyEvent { keysym: keys::RETURN, .. })));
    }

    #[test]
    fn escape_closes_only_without_chord() {
        let esc = key(keys::ESCAPE, Some('\u{1b}'));
        assert!(matches!(press_event(esc, Modifiers::empty()), WindowEvent::CloseRequested));
        assert!(matches!(press_event(esc, Modifiers::SUPER), WindowEvent::CloseRequested));
        assert!(matches!(press_event(esc, Modifiers::CTRL), WindowEvent::KeyPress(_)));
    }

    #[test]
    fn modifier_mapping() {
        let mask = ModifierMask::SHIFT | ModifierMask::MOD4;
        assert_eq!(modifiers(mask), Modifiers::SHIFT | Modifiers::SUPER);
        assert_eq!(modifiers(ModifierMask::NONE), Modifiers::empty());
    }
}
