//! Glyph widths for the standard fonts, used when a simple font omits
//! `/Widths`.
//!
//! Widths are in thousandths of a text space unit. Bold and italic faces
//! share the metrics of their regular face, and unknown fonts are measured
//! as Times-Roman.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

const HELVETICA: &[(&str, u16)] = &[
    ("space", 278), ("exclam", 278), ("quotedbl", 355), ("numbersign", 556), ("dollar", 556),
    ("percent", 889), ("ampersand", 667), ("quoteright", 222), ("parenleft", 333),
    ("parenright", 333), ("asterisk", 389), ("plus", 584), ("comma", 278), ("hyphen", 333),
    ("period", 278), ("slash", 278), ("zero", 556), ("one", 556), ("two", 556), ("three", 556),
    ("four", 556), ("five", 556), ("six", 556), ("seven", 556), ("eight", 556), ("nine", 556),
    ("colon", 278), ("semicolon", 278), ("less", 584), ("equal", 584), ("greater", 584),
    ("question", 556), ("at", 1015), ("A", 667), ("B", 667), ("C", 722), ("D", 722), ("E", 667),
    ("F", 611), ("G", 778), ("H", 722), ("I", 278), ("J", 500), ("K", 667), ("L", 556),
    ("M", 833), ("N", 722), ("O", 778), ("P", 667), ("Q", 778), ("R", 722), ("S", 667),
    ("T", 611), ("U", 722), ("V", 667), ("W", 944), ("X", 667), ("Y", 667), ("Z", 611),
    ("bracketleft", 278), ("backslash", 278), ("bracketright", 278), ("asciicircum", 469),
    ("underscore", 556), ("quoteleft", 222), ("a", 556), ("b", 556), ("c", 500), ("d", 556),
    ("e", 556), ("f", 278), ("g", 556), ("h", 556), ("i", 222), ("j", 222), ("k", 500),
    ("l", 222), ("m", 833), ("n", 556), ("o", 556), ("p", 556), ("q", 556), ("r", 333),
    ("s", 500), ("t", 278), ("u", 556), ("v", 500), ("w", 722), ("x", 500), ("y", 500),
    ("z", 500), ("braceleft", 334), ("bar", 260), ("braceright", 334), ("asciitilde", 584),
    ("exclamdown", 333), ("cent", 556), ("sterling", 556), ("fraction", 167), ("yen", 556),
    ("florin", 556), ("section", 556), ("currency", 556), ("quotesingle", 191),
    ("quotedblleft", 333), ("guillemotleft", 556), ("guilsinglleft", 333),
    ("guilsinglright", 333), ("fi", 500), ("fl", 500), ("endash", 556), ("dagger", 556),
    ("daggerdbl", 556), ("periodcentered", 278), ("paragraph", 537), ("bullet", 350),
    ("quotesinglbase", 222), ("quotedblbase", 333), ("quotedblright", 333),
    ("guillemotright", 556), ("ellipsis", 1000), ("perthousand", 1000), ("questiondown", 611),
    ("emdash", 1000), ("AE", 1000), ("ordfeminine", 370), ("Lslash", 556), ("Oslash", 778),
    ("OE", 1000), ("ordmasculine", 365), ("ae", 889), ("dotlessi", 278), ("lslash", 222),
    ("oslash", 611), ("oe", 944), ("germandbls", 611), ("Euro", 556), ("copyright", 737),
    ("registered", 737), ("trademark", 1000), ("degree", 400), ("plusminus", 584),
    ("multiply", 584), ("divide", 584), ("mu", 556), ("logicalnot", 584), ("eth", 556),
    ("thorn", 556), ("Eth", 722), ("Thorn", 667), ("grave", 333), ("acute", 333),
    ("circumflex", 333), ("tilde", 333), ("macron", 333), ("breve", 333), ("dotaccent", 333),
    ("dieresis", 333), ("ring", 333), ("cedilla", 333), ("hungarumlaut", 333), ("ogonek", 333),
    ("caron", 333),
];

const TIMES_ROMAN: &[(&str, u16)] = &[
    ("space", 250), ("exclam", 333), ("quotedbl", 408), ("numbersign", 500), ("dollar", 500),
    ("percent", 833), ("ampersand", 778), ("quoteright", 333), ("parenleft", 333),
    ("parenright", 333), ("asterisk", 500), ("plus", 564), ("comma", 250), ("hyphen", 333),
    ("period", 250), ("slash", 278), ("zero", 500), ("one", 500), ("two", 500), ("three", 500),
    ("four", 500), ("five", 500), ("six", 500), ("seven", 500), ("eight", 500), ("nine", 500),
    ("colon", 278), ("semicolon", 278), ("less", 564), ("equal", 564), ("greater", 564),
    ("question", 444), ("at", 921), ("A", 722), ("B", 667), ("C", 667), ("D", 722), ("E", 611),
    ("F", 556), ("G", 722), ("H", 722), ("I", 333), ("J", 389), ("K", 722), ("L", 611),
    ("M", 889), ("N", 722), ("O", 722), ("P", 556), ("Q", 722), ("R", 667), ("S", 556),
    ("T", 611), ("U", 722), ("V", 722), ("W", 944), ("X", 722), ("Y", 722), ("Z", 611),
    ("bracketleft", 333), ("backslash", 278), ("bracketright", 333), ("asciicircum", 469),
    ("underscore", 500), ("quoteleft", 333), ("a", 444), ("b", 500), ("c", 444), ("d", 500),
    ("e", 444), ("f", 333), ("g", 500), ("h", 500), ("i", 278), ("j", 278), ("k", 500),
    ("l", 278), ("m", 778), ("n", 500), ("o", 500), ("p", 500), ("q", 500), ("r", 333),
    ("s", 389), ("t", 278), ("u", 500), ("v", 500), ("w", 722), ("x", 500), ("y", 500),
    ("z", 444), ("braceleft", 480), ("bar", 200), ("braceright", 480), ("asciitilde", 541),
    ("exclamdown", 333), ("cent", 500), ("sterling", 500), ("fraction", 167), ("yen", 500),
    ("florin", 500), ("section", 500), ("currency", 500), ("quotesingle", 180),
    ("quotedblleft", 444), ("guillemotleft", 500), ("guilsinglleft", 333),
    ("guilsinglright", 333), ("fi", 556), ("fl", 556), ("endash", 500), ("dagger", 500),
    ("daggerdbl", 500), ("periodcentered", 250), ("paragraph", 453), ("bullet", 350),
    ("quotesinglbase", 333), ("quotedblbase", 444), ("quotedblright", 444),
    ("guillemotright", 500), ("ellipsis", 1000), ("perthousand", 1000), ("questiondown", 444),
    ("emdash", 1000), ("AE", 889), ("ordfeminine", 276), ("Lslash", 611), ("Oslash", 722),
    ("OE", 889), ("ordmasculine", 310), ("ae", 667), ("dotlessi", 278), ("lslash", 278),
    ("oslash", 500), ("oe", 722), ("germandbls", 500), ("Euro", 500), ("copyright", 760),
    ("registered", 760), ("trademark", 980), ("degree", 400), ("plusminus", 564),
    ("multiply", 564), ("divide", 564), ("mu", 500), ("logicalnot", 564), ("eth", 500),
    ("thorn", 500), ("Eth", 722), ("Thorn", 556), ("grave", 333), ("acute", 333),
    ("circumflex", 333), ("tilde", 333), ("macron", 333), ("breve", 333), ("dotaccent", 333),
    ("dieresis", 333), ("ring", 333), ("cedilla", 333), ("hungarumlaut", 333), ("ogonek", 333),
    ("caron", 333),
];

/// Accent suffixes whose composite glyphs are measured by their base letter.
const ACCENTS: &[&str] = &[
    "acute",
    "grave",
    "circumflex",
    "dieresis",
    "tilde",
    "ring",
    "cedilla",
    "caron",
];

/// Widths of one standard font family.
#[derive(Debug)]
pub struct BuiltInMetrics {
    pub family: &'static str,
    widths: FxHashMap<&'static str, u16>,
    /// Width of named glyphs missing from the table
    default_width: u16,
    monospace: bool,
}

impl BuiltInMetrics {
    fn new(family: &'static str, rows: &[(&'static str, u16)], default_width: u16) -> Self {
        Self {
            family,
            widths: rows.iter().copied().collect(),
            default_width,
            monospace: false,
        }
    }

    fn monospace(family: &'static str, width: u16) -> Self {
        Self {
            family,
            widths: FxHashMap::default(),
            default_width: width,
            monospace: true,
        }
    }

    /// Width of a glyph in glyph space units.
    pub fn width_of(&self, glyph: &str) -> f64 {
        if self.monospace {
            return f64::from(self.default_width);
        }
        if let Some(w) = self.widths.get(glyph) {
            return f64::from(*w);
        }
        let base = ACCENTS
            .iter()
            .find_map(|accent| glyph.strip_suffix(accent))
            .filter(|base| base.chars().count() == 1);
        let width = base
            .and_then(|b| self.widths.get(b))
            .unwrap_or(&self.default_width);
        f64::from(*width)
    }
}

lazy_static! {
    static ref HELVETICA_METRICS: BuiltInMetrics =
        BuiltInMetrics::new("Helvetica", HELVETICA, 556);
    static ref TIMES_METRICS: BuiltInMetrics = BuiltInMetrics::new("Times-Roman", TIMES_ROMAN, 500);
    static ref COURIER_METRICS: BuiltInMetrics = BuiltInMetrics::monospace("Courier", 600);
}

/// Metrics for a `/BaseFont`, ignoring any subset tag (`ABCDEF+`).
pub fn builtin_metrics(basefont: Option<&str>) -> &'static BuiltInMetrics {
    let name = basefont.unwrap_or_default();
    let name = match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 => rest,
        _ => name,
    };
    if name.starts_with("Courier") {
        &COURIER_METRICS
    } else if name.starts_with("Helvetica") || name.starts_with("Arial") {
        &HELVETICA_METRICS
    } else {
        &TIMES_METRICS
    }
}
