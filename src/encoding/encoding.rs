/// A table of character-classification functions for one source encoding.
///
/// Each function looks at the bytes starting at some offset and returns the
/// width in bytes of the character it found, or 0 if the bytes do not form a
/// character of that class. Widths let multibyte encodings participate in
/// identifier scanning without the lexer knowing anything about them.
#[derive(Debug, Clone, Copy)]
pub struct Encoding {
    pub name: &'static str,
    alpha_char: fn(&[u8]) -> usize,
    alnum_char: fn(&[u8]) -> usize,
    char_width: fn(&[u8]) -> usize,
}

impl Encoding {
    pub fn new(
        name: &'static str,
        alpha_char: fn(&[u8]) -> usize,
        alnum_char: fn(&[u8]) -> usize,
        char_width: fn(&[u8]) -> usize,
    ) -> Self {
        Encoding {
            name,
            alpha_char,
            alnum_char,
            char_width,
        }
    }

    /// Width of an alphabetic character at the start of `bytes`, or 0.
    pub fn alpha_char(&self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        (self.alpha_char)(bytes)
    }

    /// Width of an alphanumeric character at the start of `bytes`, or 0.
    pub fn alnum_char(&self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        (self.alnum_char)(bytes)
    }

    /// Width of any valid character at the start of `bytes`, or 0 if the
    /// bytes are not a valid sequence for this encoding.
    pub fn char_width(&self, bytes: &[u8]) -> usize {
        if bytes.is_empty() {
            return 0;
        }
        (self.char_width)(bytes)
    }

    /// The encoding every parse starts with.
    pub fn default() -> Encoding {
        UTF_8
    }

    /// Look up one of the built-in encodings by the name found in a magic
    /// comment. Matching is case-insensitive.
    pub fn find(name: &str) -> Option<Encoding> {
        let lowered = name.to_ascii_lowercase();
        match lowered.as_str() {
            "utf-8" | "utf8" => Some(UTF_8),
            "ascii" | "us-ascii" => Some(ASCII),
            "binary" => Some(BINARY),
            "iso-8859-1" | "latin-1" => Some(ISO_8859_1),
            _ => None,
        }
    }
}

/// The fallback strategy consulted when a magic comment names an encoding
/// the built-in table does not cover. Returning `None` means the callback
/// does not understand the name either, and the lexer keeps the default
/// encoding with a warning diagnostic.
pub type EncodingCallback = Box<dyn Fn(&str) -> Option<Encoding>>;

pub const UTF_8: Encoding = Encoding {
    name: "utf-8",
    alpha_char: utf_8_alpha_char,
    alnum_char: utf_8_alnum_char,
    char_width: utf_8_char_width,
};

pub const ASCII: Encoding = Encoding {
    name: "ascii",
    alpha_char: ascii_alpha_char,
    alnum_char: ascii_alnum_char,
    char_width: ascii_char_width,
};

pub const BINARY: Encoding = Encoding {
    name: "binary",
    alpha_char: ascii_alpha_char,
    alnum_char: ascii_alnum_char,
    char_width: binary_char_width,
};

pub const ISO_8859_1: Encoding = Encoding {
    name: "iso-8859-1",
    alpha_char: iso_8859_1_alpha_char,
    alnum_char: iso_8859_1_alnum_char,
    char_width: binary_char_width,
};

fn ascii_alpha_char(bytes: &[u8]) -> usize {
    usize::from(bytes[0].is_ascii_alphabetic())
}

fn ascii_alnum_char(bytes: &[u8]) -> usize {
    usize::from(bytes[0].is_ascii_alphanumeric())
}

fn ascii_char_width(bytes: &[u8]) -> usize {
    usize::from(bytes[0] < 0x80)
}

// In the binary encoding every byte is a valid opaque character, but only
// ASCII letters count as identifier characters.
fn binary_char_width(_bytes: &[u8]) -> usize {
    1
}

// ISO-8859-1 letters: ASCII letters plus the accented range, minus the
// multiplication and division signs.
fn iso_8859_1_alpha_char(bytes: &[u8]) -> usize {
    let byte = bytes[0];
    let accented = (0xC0..=0xFF).contains(&byte) && byte != 0xD7 && byte != 0xF7;
    usize::from(byte.is_ascii_alphabetic() || byte == 0xAA || byte == 0xB5 || byte == 0xBA || accented)
}

fn iso_8859_1_alnum_char(bytes: &[u8]) -> usize {
    if bytes[0].is_ascii_digit() {
        1
    } else {
        iso_8859_1_alpha_char(bytes)
    }
}

fn utf_8_decode(bytes: &[u8]) -> Option<(char, usize)> {
    let width = match bytes[0] {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return None,
    };

    if bytes.len() < width {
        return None;
    }

    let text = std::str::from_utf8(&bytes[..width]).ok()?;
    text.chars().next().map(|c| (c, width))
}

fn utf_8_alpha_char(bytes: &[u8]) -> usize {
    match utf_8_decode(bytes) {
        Some((c, width)) if c.is_alphabetic() => width,
        _ => 0,
    }
}

fn utf_8_alnum_char(bytes: &[u8]) -> usize {
    match utf_8_decode(bytes) {
        Some((c, width)) if c.is_alphanumeric() => width,
        _ => 0,
    }
}

fn utf_8_char_width(bytes: &[u8]) -> usize {
    match utf_8_decode(bytes) {
        Some((_, width)) => width,
        None => 0,
    }
}
