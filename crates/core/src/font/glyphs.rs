//! Glyph names to Unicode.
//!
//! Known names come from the Latin character set plus a short list of Greek,
//! ligature and symbol names seen in `/Differences` arrays. Anything else
//! goes through the naming conventions fonts use for synthesized glyphs:
//! `uniXXXX`, `uXXXX[XX]`, `Xhh`, `g123` and `cid00123`-style numbers.

use super::latin::LATIN_CHARSET;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

const EXTRA_NAMES: &[(&str, char)] = &[
    ("Alpha", '\u{391}'),
    ("Beta", '\u{392}'),
    ("Gamma", '\u{393}'),
    ("Delta", '\u{394}'),
    ("Epsilon", '\u{395}'),
    ("Zeta", '\u{396}'),
    ("Eta", '\u{397}'),
    ("Theta", '\u{398}'),
    ("Iota", '\u{399}'),
    ("Kappa", '\u{39a}'),
    ("Lambda", '\u{39b}'),
    ("Mu", '\u{39c}'),
    ("Nu", '\u{39d}'),
    ("Xi", '\u{39e}'),
    ("Omicron", '\u{39f}'),
    ("Pi", '\u{3a0}'),
    ("Rho", '\u{3a1}'),
    ("Sigma", '\u{3a3}'),
    ("Tau", '\u{3a4}'),
    ("Upsilon", '\u{3a5}'),
    ("Phi", '\u{3a6}'),
    ("Chi", '\u{3a7}'),
    ("Psi", '\u{3a8}'),
    ("Omega", '\u{3a9}'),
    ("alpha", '\u{3b1}'),
    ("beta", '\u{3b2}'),
    ("gamma", '\u{3b3}'),
    ("delta", '\u{3b4}'),
    ("epsilon", '\u{3b5}'),
    ("zeta", '\u{3b6}'),
    ("eta", '\u{3b7}'),
    ("theta", '\u{3b8}'),
    ("iota", '\u{3b9}'),
    ("kappa", '\u{3ba}'),
    ("lambda", '\u{3bb}'),
    ("nu", '\u{3bd}'),
    ("xi", '\u{3be}'),
    ("omicron", '\u{3bf}'),
    ("pi", '\u{3c0}'),
    ("rho", '\u{3c1}'),
    ("sigma1", '\u{3c2}'),
    ("sigma", '\u{3c3}'),
    ("tau", '\u{3c4}'),
    ("upsilon", '\u{3c5}'),
    ("phi", '\u{3c6}'),
    ("chi", '\u{3c7}'),
    ("psi", '\u{3c8}'),
    ("omega", '\u{3c9}'),
    ("ff", '\u{fb00}'),
    ("ffi", '\u{fb03}'),
    ("ffl", '\u{fb04}'),
    ("dotlessj", '\u{237}'),
    ("sfthyphen", '\u{ad}'),
    ("nonbreakingspace", '\u{a0}'),
    ("figuredash", '\u{2012}'),
    ("quotereversed", '\u{201b}'),
    ("infinity", '\u{221e}'),
    ("notequal", '\u{2260}'),
    ("lessequal", '\u{2264}'),
    ("greaterequal", '\u{2265}'),
    ("approxequal", '\u{2248}'),
    ("partialdiff", '\u{2202}'),
    ("summation", '\u{2211}'),
    ("product", '\u{220f}'),
    ("radical", '\u{221a}'),
    ("integral", '\u{222b}'),
    ("lozenge", '\u{25ca}'),
    ("arrowleft", '\u{2190}'),
    ("arrowup", '\u{2191}'),
    ("arrowright", '\u{2192}'),
    ("arrowdown", '\u{2193}'),
    ("arrowboth", '\u{2194}'),
    ("checkmark", '\u{2713}'),
    ("Scedilla", '\u{15e}'),
    ("scedilla", '\u{15f}'),
    ("Gbreve", '\u{11e}'),
    ("gbreve", '\u{11f}'),
    ("Idotaccent", '\u{130}'),
    ("Ccaron", '\u{10c}'),
    ("ccaron", '\u{10d}'),
    ("Rcaron", '\u{158}'),
    ("rcaron", '\u{159}'),
    ("Ecaron", '\u{11a}'),
    ("ecaron", '\u{11b}'),
    ("Uring", '\u{16e}'),
    ("uring", '\u{16f}'),
    ("Ohungarumlaut", '\u{150}'),
    ("ohungarumlaut", '\u{151}'),
    ("Uhungarumlaut", '\u{170}'),
    ("uhungarumlaut", '\u{171}'),
    ("Aogonek", '\u{104}'),
    ("aogonek", '\u{105}'),
    ("Eogonek", '\u{118}'),
    ("eogonek", '\u{119}'),
    ("Sacute", '\u{15a}'),
    ("sacute", '\u{15b}'),
    ("Zacute", '\u{179}'),
    ("zacute", '\u{17a}'),
    ("Zdotaccent", '\u{17b}'),
    ("zdotaccent", '\u{17c}'),
    ("Nacute", '\u{143}'),
    ("nacute", '\u{144}'),
    ("Cacute", '\u{106}'),
    ("cacute", '\u{107}'),
];

lazy_static! {
    static ref GLYPH_NAMES: FxHashMap<&'static str, char> = {
        let mut map = FxHashMap::default();
        for (name, c, ..) in LATIN_CHARSET {
            map.insert(*name, *c);
        }
        for (name, c) in EXTRA_NAMES {
            map.insert(*name, *c);
        }
        map
    };
}

/// Unicode text for a glyph name, or `None` for `.notdef` and names that
/// follow no known convention.
///
/// A `.suffix` (as in `a.sc`) is dropped and `_` joins ligature components
/// (`f_f_i`).
pub fn name_to_unicode(name: &str) -> Option<String> {
    if let Some(c) = GLYPH_NAMES.get(name) {
        return Some(c.to_string());
    }
    let base = name.split('.').next().unwrap_or_default();
    if base.is_empty() {
        return None;
    }
    let mut text = String::new();
    for part in base.split('_') {
        text.push(component(part)?);
    }
    Some(text)
}

fn component(name: &str) -> Option<char> {
    if let Some(c) = GLYPH_NAMES.get(name) {
        return Some(*c);
    }
    let hex = |s: &str| u32::from_str_radix(s, 16).ok().and_then(char::from_u32);
    let dec = |s: &str| s.parse::<u32>().ok().and_then(char::from_u32);
    let bytes = name.as_bytes();
    let all = |s: &str, f: fn(&u8) -> bool| !s.is_empty() && s.as_bytes().iter().all(f);
    let upper_hex = |b: &u8| b.is_ascii_digit() || (b'A'..=b'F').contains(b);

    if let Some(rest) = name.strip_prefix("uni") {
        if rest.len() == 4 && all(rest, upper_hex) {
            return hex(rest);
        }
    }
    if let Some(rest) = name.strip_prefix('u') {
        if (4..=6).contains(&rest.len()) && all(rest, upper_hex) {
            return hex(rest);
        }
    }
    if let Some(rest) = name.strip_prefix('X') {
        if (2..=4).contains(&rest.len()) && all(rest, u8::is_ascii_hexdigit) {
            return hex(rest);
        }
    }
    match bytes {
        [a, rest @ ..] if a.is_ascii_alphabetic() && (1..=5).contains(&rest.len()) => {
            if rest.iter().all(u8::is_ascii_digit) {
                return dec(&name[1..]);
            }
        }
        _ => {}
    }
    match bytes {
        [a, b, rest @ ..]
            if a.is_ascii_alphabetic()
                && b.is_ascii_alphabetic()
                && (2..=5).contains(&rest.len())
                && rest.iter().all(u8::is_ascii_digit) =>
        {
            dec(&name[2..])
        }
        _ => None,
    }
}
