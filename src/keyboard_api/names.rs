//! Human readable key names. Backends that only know raw key symbols use [keysym_name], so that
//! the same physical key gets the same name in every report.

use std::sync::Arc;

/// Name of an X11 keysym. Left and right variants of modifiers share a name.
pub fn keysym_name(keysym: u32) -> Arc<str> {
    if let Some(name) = named_keysym(keysym) {
        return name.into();
    }

    match keysym {
        // Latin-1 letters are reported in upper case, the same key is counted regardless of shift.
        0x61..=0x7a => char_name(keysym - 0x20),
        0x21..=0x7e => char_name(keysym),
        0xffbe..=0xffd5 => format!("F{}", keysym - 0xffbe + 1).into(),
        0xffb0..=0xffb9 => format!("NumPad {}", keysym - 0xffb0).into(),
        _ => format!("Unknown keysym 0x{keysym:x}").into(),
    }
}

fn char_name(code: u32) -> Arc<str> {
    match char::from_u32(code) {
        Some(c) => c.to_string().into(),
        None => format!("Unknown keysym 0x{code:x}").into(),
    }
}

fn named_keysym(keysym: u32) -> Option<&'static str> {
    let name = match keysym {
        0x0020 => "Space",
        0x0027 => "Quote",
        0x002c => "Comma",
        0x002d => "Minus",
        0x002e => "Period",
        0x002f => "Slash",
        0x003b => "Semicolon",
        0x003d => "Equals",
        0x005b => "Open Bracket",
        0x005c => "Back Slash",
        0x005d => "Close Bracket",
        0x0060 => "Back Quote",
        0xff08 => "Backspace",
        0xff09 => "Tab",
        0xff0d => "Enter",
        0xff13 => "Pause",
        0xff14 => "Scroll Lock",
        0xff1b => "Escape",
        0xff50 => "Home",
        0xff51 => "Left",
        0xff52 => "Up",
        0xff53 => "Right",
        0xff54 => "Down",
        0xff55 => "Page Up",
        0xff56 => "Page Down",
        0xff57 => "End",
        0xff61 => "Print Screen",
        0xff63 => "Insert",
        0xff67 => "Context Menu",
        0xff7f => "Num Lock",
        0xff8d => "NumPad Enter",
        0xffaa => "NumPad Multiply",
        0xffab => "NumPad Add",
        0xffad => "NumPad Subtract",
        0xffae => "NumPad Separator",
        0xffaf => "NumPad Divide",
        0xffe1 | 0xffe2 => "Shift",
        0xffe3 | 0xffe4 => "Ctrl",
        0xffe5 => "Caps Lock",
        0xffe7 | 0xffe8 | 0xffeb | 0xffec => "Meta",
        0xffe9 | 0xffea | 0xfe03 => "Alt",
        0xffff => "Delete",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::keysym_name;

    #[test]
    fn test_letters_ignore_case() {
        assert_eq!(&*keysym_name(0x61), "A");
        assert_eq!(&*keysym_name(0x41), "A");
        assert_eq!(&*keysym_name(0x7a), "Z");
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(&*keysym_name(0x20), "Space");
        assert_eq!(&*keysym_name(0xff0d), "Enter");
        assert_eq!(&*keysym_name(0xffe1), "Shift");
        assert_eq!(&*keysym_name(0xffe2), "Shift");
        assert_eq!(&*keysym_name(0x31), "1");
        assert_eq!(&*keysym_name(0xffbe), "F1");
        assert_eq!(&*keysym_name(0xffc9), "F12");
        assert_eq!(&*keysym_name(0xffb7), "NumPad 7");
    }

    #[test]
    fn test_unknown_keysym() {
        assert_eq!(&*keysym_name(0x1008ff11), "Unknown keysym 0x1008ff11");
    }
}
