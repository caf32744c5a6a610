//! Toolkit-independent key names.
//!
//! Names follow the X11 keysym vocabulary (`a`, `A`, `period`, `Shift_L`,
//! `BackSpace`) so logs read the same whichever surface produced them.

/// Keysym for a single printable character.
pub fn keysym_for_char(c: char) -> String {
    if c.is_ascii_alphanumeric() {
        return c.to_string();
    }
    let name = match c {
        ' ' => "space",
        '!' => "exclam",
        '"' => "quotedbl",
        '#' => "numbersign",
        '$' => "dollar",
        '%' => "percent",
        '&' => "ampersand",
        '\'' => "apostrophe",
        '(' => "parenleft",
        ')' => "parenright",
        '*' => "asterisk",
        '+' => "plus",
        ',' => "comma",
        '-' => "minus",
        '.' => "period",
        '/' => "slash",
        ':' => "colon",
        ';' => "semicolon",
        '<' => "less",
        '=' => "equal",
        '>' => "greater",
        '?' => "question",
        '@' => "at",
        '[' => "bracketleft",
        '\\' => "backslash",
        ']' => "bracketright",
        '^' => "asciicircum",
        '_' => "underscore",
        '`' => "grave",
        '{' => "braceleft",
        '|' => "bar",
        '}' => "braceright",
        '~' => "asciitilde",
        _ => return format!("U{:04X}", c as u32),
    };
    name.to_string()
}

/// Keysym for a Win32 virtual-key press.
///
/// `text` is what the keyboard layout produced for the press; when it is a
/// single printable character its name wins, so Shift+1 reads `exclam`.
pub fn keysym_for_virtual_key(vk: u32, scan_code: u32, extended: bool, text: Option<&str>) -> String {
    if let Some(c) = single_printable(text) {
        if !matches!(vk, 0x60..=0x6F) {
            return keysym_for_char(c);
        }
    }
    let name = match vk {
        0x08 => "BackSpace",
        0x09 => "Tab",
        0x0C => "Clear",
        0x0D if extended => "KP_Enter",
        0x0D => "Return",
        0x10 if scan_code == 0x36 => "Shift_R",
        0x10 => "Shift_L",
        0x11 if extended => "Control_R",
        0x11 => "Control_L",
        0x12 if extended => "Alt_R",
        0x12 => "Alt_L",
        0x13 => "Pause",
        0x14 => "Caps_Lock",
        0x1B => "Escape",
        0x20 => "space",
        0x21 => "Prior",
        0x22 => "Next",
        0x23 => "End",
        0x24 => "Home",
        0x25 => "Left",
        0x26 => "Up",
        0x27 => "Right",
        0x28 => "Down",
        0x2C => "Print",
        0x2D => "Insert",
        0x2E => "Delete",
        0x2F => "Help",
        0x5B => "Win_L",
        0x5C => "Win_R",
        0x5D => "App",
        0x6A => "KP_Multiply",
        0x6B => "KP_Add",
        0x6D => "KP_Subtract",
        0x6E => "KP_Decimal",
        0x6F => "KP_Divide",
        0x90 => "Num_Lock",
        0x91 => "Scroll_Lock",
        0xA0 => "Shift_L",
        0xA1 => "Shift_R",
        0xA2 => "Control_L",
        0xA3 => "Control_R",
        0xA4 => "Alt_L",
        0xA5 => "Alt_R",
        0x30..=0x39 => return ((vk as u8) as char).to_string(),
        0x41..=0x5A => return ((vk as u8) as char).to_ascii_lowercase().to_string(),
        0x60..=0x69 => return format!("KP_{}", vk - 0x60),
        0x70..=0x87 => return format!("F{}", vk - 0x6F),
        _ => return format!("VK_{vk:02X}"),
    };
    name.to_string()
}

fn single_printable(text: Option<&str>) -> Option<char> {
    let text = text.filter(|text| crate::record::is_printable(text))?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_name_themselves() {
        assert_eq!(keysym_for_char('a'), "a");
        assert_eq!(keysym_for_char('Q'), "Q");
        assert_eq!(keysym_for_char('7'), "7");
    }

    #[test]
    fn punctuation_uses_x11_names() {
        assert_eq!(keysym_for_char('.'), "period");
        assert_eq!(keysym_for_char(' '), "space");
        assert_eq!(keysym_for_char('\''), "apostrophe");
        assert_eq!(keysym_for_char('~'), "asciitilde");
    }

    #[test]
    fn other_characters_use_unicode_form() {
        assert_eq!(keysym_for_char('é'), "U00E9");
        assert_eq!(keysym_for_char('€'), "U20AC");
    }

    #[test]
    fn produced_text_names_the_key() {
        assert_eq!(keysym_for_virtual_key(0x41, 0x1E, false, Some("a")), "a");
        assert_eq!(keysym_for_virtual_key(0x41, 0x1E, false, Some("A")), "A");
        assert_eq!(keysym_for_virtual_key(0x31, 0x02, false, Some("!")), "exclam");
        assert_eq!(keysym_for_virtual_key(0xBE, 0x34, false, Some(".")), "period");
    }

    #[test]
    fn keys_without_text_fall_back_to_the_virtual_key() {
        assert_eq!(keysym_for_virtual_key(0x10, 0x2A, false, None), "Shift_L");
        assert_eq!(keysym_for_virtual_key(0x10, 0x36, false, None), "Shift_R");
        assert_eq!(keysym_for_virtual_key(0x11, 0x1D, true, None), "Control_R");
        assert_eq!(keysym_for_virtual_key(0x0D, 0x1C, false, Some("\r")), "Return");
        assert_eq!(keysym_for_virtual_key(0x08, 0x0E, false, Some("\u{8}")), "BackSpace");
        assert_eq!(keysym_for_virtual_key(0x74, 0x3F, false, None), "F5");
        assert_eq!(keysym_for_virtual_key(0xFF, 0, false, None), "VK_FF");
    }

    #[test]
    fn control_chords_keep_the_letter() {
        assert_eq!(keysym_for_virtual_key(0x43, 0x2E, false, Some("\u{3}")), "c");
    }

    #[test]
    fn keypad_digits_are_distinguished() {
        assert_eq!(keysym_for_virtual_key(0x63, 0x51, false, Some("3")), "KP_3");
        assert_eq!(keysym_for_virtual_key(0x6B, 0x4E, false, Some("+")), "KP_Add");
    }
}
