//! Escape codec
//!
//! Every reserved character maps to a backslash followed by one letter.
//!
//! ```text
//! \   -> \\       /  -> \/      ' ' -> \s     |  -> \p
//! BEL -> \a        BS -> \b      FF  -> \f     LF -> \n
//! CR  -> \r        HT -> \t      VT  -> \v
//! ```

use std::borrow::Cow;

/// (raw character, escape letter) pairs
const ESCAPES: [(char, char); 11] = [
    ('\\', '\\'),
    ('/', '/'),
    (' ', 's'),
    ('|', 'p'),
    ('\x07', 'a'),
    ('\x08', 'b'),
    ('\x0c', 'f'),
    ('\n', 'n'),
    ('\r', 'r'),
    ('\t', 't'),
    ('\x0b', 'v'),
];

fn escape_letter(c: char) -> Option<char> {
    ESCAPES.iter().find(|(raw, _)| *raw == c).map(|(_, letter)| *letter)
}

fn unescape_letter(letter: char) -> Option<char> {
    ESCAPES.iter().find(|(_, l)| *l == letter).map(|(raw, _)| *raw)
}

/// Escape every reserved character in `s`
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| escape_letter(c).is_some()) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_letter(c) {
            Some(letter) => {
                out.push('\\');
                out.push(letter);
            }
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`escape`].
///
/// Unknown escape pairs are kept as they are; a trailing lone backslash too.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('\\') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(letter) => match unescape_letter(letter) {
                Some(raw) => out.push(raw),
                None => {
                    out.push('\\');
                    out.push(letter);
                }
            },
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}
