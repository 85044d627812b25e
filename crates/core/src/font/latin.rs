//! Latin character set shared by the standard, Mac Roman and WinAnsi
//! encodings (PDF 1.7, Appendix D.2).

use lazy_static::lazy_static;

/// Glyph name, its Unicode value, and its code in StandardEncoding,
/// MacRomanEncoding and WinAnsiEncoding.
pub type LatinRow = (&'static str, char, Option<u8>, Option<u8>, Option<u8>);

pub const LATIN_CHARSET: &[LatinRow] = &[
    ("A", '\u{41}', Some(65), Some(65), Some(65)),
    ("AE", '\u{c6}', Some(225), Some(174), Some(198)),
    ("Aacute", '\u{c1}', None, Some(231), Some(193)),
    ("Acircumflex", '\u{c2}', None, Some(229), Some(194)),
    ("Adieresis", '\u{c4}', None, Some(128), Some(196)),
    ("Agrave", '\u{c0}', None, Some(203), Some(192)),
    ("Aring", '\u{c5}', None, Some(129), Some(197)),
    ("Atilde", '\u{c3}', None, Some(204), Some(195)),
    ("B", '\u{42}', Some(66), Some(66), Some(66)),
    ("C", '\u{43}', Some(67), Some(67), Some(67)),
    ("Ccedilla", '\u{c7}', None, Some(130), Some(199)),
    ("D", '\u{44}', Some(68), Some(68), Some(68)),
    ("E", '\u{45}', Some(69), Some(69), Some(69)),
    ("Eacute", '\u{c9}', None, Some(131), Some(201)),
    ("Ecircumflex", '\u{ca}', None, Some(230), Some(202)),
    ("Edieresis", '\u{cb}', None, Some(232), Some(203)),
    ("Egrave", '\u{c8}', None, Some(233), Some(200)),
    ("Eth", '\u{d0}', None, None, Some(208)),
    ("Euro", '\u{20ac}', None, None, Some(128)),
    ("F", '\u{46}', Some(70), Some(70), Some(70)),
    ("G", '\u{47}', Some(71), Some(71), Some(71)),
    ("H", '\u{48}', Some(72), Some(72), Some(72)),
    ("I", '\u{49}', Some(73), Some(73), Some(73)),
    ("Iacute", '\u{cd}', None, Some(234), Some(205)),
    ("Icircumflex", '\u{ce}', None, Some(235), Some(206)),
    ("Idieresis", '\u{cf}', None, Some(236), Some(207)),
    ("Igrave", '\u{cc}', None, Some(237), Some(204)),
    ("J", '\u{4a}', Some(74), Some(74), Some(74)),
    ("K", '\u{4b}', Some(75), Some(75), Some(75)),
    ("L", '\u{4c}', Some(76), Some(76), Some(76)),
    ("Lslash", '\u{141}', Some(232), None, None),
    ("M", '\u{4d}', Some(77), Some(77), Some(77)),
    ("N", '\u{4e}', Some(78), Some(78), Some(78)),
    ("Ntilde", '\u{d1}', None, Some(132), Some(209)),
    ("O", '\u{4f}', Some(79), Some(79), Some(79)),
    ("OE", '\u{152}', Some(234), Some(206), Some(140)),
    ("Oacute", '\u{d3}', None, Some(238), Some(211)),
    ("Ocircumflex", '\u{d4}', None, Some(239), Some(212)),
    ("Odieresis", '\u{d6}', None, Some(133), Some(214)),
    ("Ograve", '\u{d2}', None, Some(241), Some(210)),
    ("Oslash", '\u{d8}', Some(233), Some(175), Some(216)),
    ("Otilde", '\u{d5}', None, Some(205), Some(213)),
    ("P", '\u{50}', Some(80), Some(80), Some(80)),
    ("Q", '\u{51}', Some(81), Some(81), Some(81)),
    ("R", '\u{52}', Some(82), Some(82), Some(82)),
    ("S", '\u{53}', Some(83), Some(83), Some(83)),
    ("Scaron", '\u{160}', None, None, Some(138)),
    ("T", '\u{54}', Some(84), Some(84), Some(84)),
    ("Thorn", '\u{de}', None, None, Some(222)),
    ("U", '\u{55}', Some(85), Some(85), Some(85)),
    ("Uacute", '\u{da}', None, Some(242), Some(218)),
    ("Ucircumflex", '\u{db}', None, Some(243), Some(219)),
    ("Udieresis", '\u{dc}', None, Some(134), Some(220)),
    ("Ugrave", '\u{d9}', None, Some(244), Some(217)),
    ("V", '\u{56}', Some(86), Some(86), Some(86)),
    ("W", '\u{57}', Some(87), Some(87), Some(87)),
    ("X", '\u{58}', Some(88), Some(88), Some(88)),
    ("Y", '\u{59}', Some(89), Some(89), Some(89)),
    ("Yacute", '\u{dd}', None, None, Some(221)),
    ("Ydieresis", '\u{178}', None, Some(217), Some(159)),
    ("Z", '\u{5a}', Some(90), Some(90), Some(90)),
    ("Zcaron", '\u{17d}', None, None, Some(142)),
    ("a", '\u{61}', Some(97), Some(97), Some(97)),
    ("aacute", '\u{e1}', None, Some(135), Some(225)),
    ("acircumflex", '\u{e2}', None, Some(137), Some(226)),
    ("acute", '\u{b4}', Some(194), Some(171), Some(180)),
    ("adieresis", '\u{e4}', None, Some(138), Some(228)),
    ("ae", '\u{e6}', Some(241), Some(190), Some(230)),
    ("agrave", '\u{e0}', None, Some(136), Some(224)),
    ("ampersand", '\u{26}', Some(38), Some(38), Some(38)),
    ("aring", '\u{e5}', None, Some(140), Some(229)),
    ("asciicircum", '\u{5e}', Some(94), Some(94), Some(94)),
    ("asciitilde", '\u{7e}', Some(126), Some(126), Some(126)),
    ("asterisk", '\u{2a}', Some(42), Some(42), Some(42)),
    ("at", '\u{40}', Some(64), Some(64), Some(64)),
    ("atilde", '\u{e3}', None, Some(139), Some(227)),
    ("b", '\u{62}', Some(98), Some(98), Some(98)),
    ("backslash", '\u{5c}', Some(92), Some(92), Some(92)),
    ("bar", '\u{7c}', Some(124), Some(124), Some(124)),
    ("braceleft", '\u{7b}', Some(123), Some(123), Some(123)),
    ("braceright", '\u{7d}', Some(125), Some(125), Some(125)),
    ("bracketleft", '\u{5b}', Some(91), Some(91), Some(91)),
    ("bracketright", '\u{5d}', Some(93), Some(93), Some(93)),
    ("breve", '\u{2d8}', Some(198), Some(249), None),
    ("brokenbar", '\u{a6}', None, None, Some(166)),
    ("bullet", '\u{2022}', Some(183), Some(165), Some(149)),
    ("c", '\u{63}', Some(99), Some(99), Some(99)),
    ("caron", '\u{2c7}', Some(207), Some(255), None),
    ("ccedilla", '\u{e7}', None, Some(141), Some(231)),
    ("cedilla", '\u{b8}', Some(203), Some(252), Some(184)),
    ("cent", '\u{a2}', Some(162), Some(162), Some(162)),
    ("circumflex", '\u{2c6}', Some(195), Some(246), Some(136)),
    ("colon", '\u{3a}', Some(58), Some(58), Some(58)),
    ("comma", '\u{2c}', Some(44), Some(44), Some(44)),
    ("copyright", '\u{a9}', None, Some(169), Some(169)),
    ("currency", '\u{a4}', Some(168), Some(219), Some(164)),
    ("d", '\u{64}', Some(100), Some(100), Some(100)),
    ("dagger", '\u{2020}', Some(178), Some(160), Some(134)),
    ("daggerdbl", '\u{2021}', Some(179), Some(224), Some(135)),
    ("degree", '\u{b0}', None, Some(161), Some(176)),
    ("dieresis", '\u{a8}', Some(200), Some(172), Some(168)),
    ("divide", '\u{f7}', None, Some(214), Some(247)),
    ("dollar", '\u{24}', Some(36), Some(36), Some(36)),
    ("dotaccent", '\u{2d9}', Some(199), Some(250), None),
    ("dotlessi", '\u{131}', Some(245), Some(245), None),
    ("e", '\u{65}', Some(101), Some(101), Some(101)),
    ("eacute", '\u{e9}', None, Some(142), Some(233)),
    ("ecircumflex", '\u{ea}', None, Some(144), Some(234)),
    ("edieresis", '\u{eb}', None, Some(145), Some(235)),
    ("egrave", '\u{e8}', None, Some(143), Some(232)),
    ("eight", '\u{38}', Some(56), Some(56), Some(56)),
    ("ellipsis", '\u{2026}', Some(188), Some(201), Some(133)),
    ("emdash", '\u{2014}', Some(208), Some(209), Some(151)),
    ("endash", '\u{2013}', Some(177), Some(208), Some(150)),
    ("equal", '\u{3d}', Some(61), Some(61), Some(61)),
    ("eth", '\u{f0}', None, None, Some(240)),
    ("exclam", '\u{21}', Some(33), Some(33), Some(33)),
    ("exclamdown", '\u{a1}', Some(161), Some(193), Some(161)),
    ("f", '\u{66}', Some(102), Some(102), Some(102)),
    ("fi", '\u{fb01}', Some(174), Some(222), None),
    ("five", '\u{35}', Some(53), Some(53), Some(53)),
    ("fl", '\u{fb02}', Some(175), Some(223), None),
    ("florin", '\u{192}', Some(166), Some(196), Some(131)),
    ("four", '\u{34}', Some(52), Some(52), Some(52)),
    ("fraction", '\u{2044}', Some(164), Some(218), None),
    ("g", '\u{67}', Some(103), Some(103), Some(103)),
    ("germandbls", '\u{df}', Some(251), Some(167), Some(223)),
    ("grave", '\u{60}', Some(193), Some(96), Some(96)),
    ("greater", '\u{3e}', Some(62), Some(62), Some(62)),
    ("guillemotleft", '\u{ab}', Some(171), Some(199), Some(171)),
    ("guillemotright", '\u{bb}', Some(187), Some(200), Some(187)),
    ("guilsinglleft", '\u{2039}', Some(172), Some(220), Some(139)),
    ("guilsinglright", '\u{203a}', Some(173), Some(221), Some(155)),
    ("h", '\u{68}', Some(104), Some(104), Some(104)),
    ("hungarumlaut", '\u{2dd}', Some(205), Some(253), None),
    ("hyphen", '\u{2d}', Some(45), Some(45), Some(45)),
    ("i", '\u{69}', Some(105), Some(105), Some(105)),
    ("iacute", '\u{ed}', None, Some(146), Some(237)),
    ("icircumflex", '\u{ee}', None, Some(148), Some(238)),
    ("idieresis", '\u{ef}', None, Some(149), Some(239)),
    ("igrave", '\u{ec}', None, Some(147), Some(236)),
    ("j", '\u{6a}', Some(106), Some(106), Some(106)),
    ("k", '\u{6b}', Some(107), Some(107), Some(107)),
    ("l", '\u{6c}', Some(108), Some(108), Some(108)),
    ("less", '\u{3c}', Some(60), Some(60), Some(60)),
    ("logicalnot", '\u{ac}', None, Some(194), Some(172)),
    ("lslash", '\u{142}', Some(248), None, None),
    ("m", '\u{6d}', Some(109), Some(109), Some(109)),
    ("macron", '\u{af}', Some(197), Some(248), Some(175)),
    ("minus", '\u{2212}', None, None, None),
    ("mu", '\u{b5}', None, Some(181), Some(181)),
    ("multiply", '\u{d7}', None, None, Some(215)),
    ("n", '\u{6e}', Some(110), Some(110), Some(110)),
    ("nbspace", '\u{a0}', None, Some(202), Some(160)),
    ("nine", '\u{39}', Some(57), Some(57), Some(57)),
    ("ntilde", '\u{f1}', None, Some(150), Some(241)),
    ("numbersign", '\u{23}', Some(35), Some(35), Some(35)),
    ("o", '\u{6f}', Some(111), Some(111), Some(111)),
    ("oacute", '\u{f3}', None, Some(151), Some(243)),
    ("ocircumflex", '\u{f4}', None, Some(153), Some(244)),
    ("odieresis", '\u{f6}', None, Some(154), Some(246)),
    ("oe", '\u{153}', Some(250), Some(207), Some(156)),
    ("ogonek", '\u{2db}', Some(206), Some(254), None),
    ("ograve", '\u{f2}', None, Some(152), Some(242)),
    ("one", '\u{31}', Some(49), Some(49), Some(49)),
    ("onehalf", '\u{bd}', None, None, Some(189)),
    ("onequarter", '\u{bc}', None, None, Some(188)),
    ("onesuperior", '\u{b9}', None, None, Some(185)),
    ("ordfeminine", '\u{aa}', Some(227), Some(187), Some(170)),
    ("ordmasculine", '\u{ba}', Some(235), Some(188), Some(186)),
    ("oslash", '\u{f8}', Some(249), Some(191), Some(248)),
    ("otilde", '\u{f5}', None, Some(155), Some(245)),
    ("p", '\u{70}', Some(112), Some(112), Some(112)),
    ("paragraph", '\u{b6}', Some(182), Some(166), Some(182)),
    ("parenleft", '\u{28}', Some(40), Some(40), Some(40)),
    ("parenright", '\u{29}', Some(41), Some(41), Some(41)),
    ("percent", '\u{25}', Some(37), Some(37), Some(37)),
    ("period", '\u{2e}', Some(46), Some(46), Some(46)),
    ("periodcentered", '\u{b7}', Some(180), Some(225), Some(183)),
    ("perthousand", '\u{2030}', Some(189), Some(228), Some(137)),
    ("plus", '\u{2b}', Some(43), Some(43), Some(43)),
    ("plusminus", '\u{b1}', None, Some(177), Some(177)),
    ("q", '\u{71}', Some(113), Some(113), Some(113)),
    ("question", '\u{3f}', Some(63), Some(63), Some(63)),
    ("questiondown", '\u{bf}', Some(191), Some(192), Some(191)),
    ("quotedbl", '\u{22}', Some(34), Some(34), Some(34)),
    ("quotedblbase", '\u{201e}', Some(185), Some(227), Some(132)),
    ("quotedblleft", '\u{201c}', Some(170), Some(210), Some(147)),
    ("quotedblright", '\u{201d}', Some(186), Some(211), Some(148)),
    ("quoteleft", '\u{2018}', Some(96), Some(212), Some(145)),
    ("quoteright", '\u{2019}', Some(39), Some(213), Some(146)),
    ("quotesinglbase", '\u{201a}', Some(184), Some(226), Some(130)),
    ("quotesingle", '\u{27}', Some(169), Some(39), Some(39)),
    ("r", '\u{72}', Some(114), Some(114), Some(114)),
    ("registered", '\u{ae}', None, Some(168), Some(174)),
    ("ring", '\u{2da}', Some(202), Some(251), None),
    ("s", '\u{73}', Some(115), Some(115), Some(115)),
    ("scaron", '\u{161}', None, None, Some(154)),
    ("section", '\u{a7}', Some(167), Some(164), Some(167)),
    ("semicolon", '\u{3b}', Some(59), Some(59), Some(59)),
    ("seven", '\u{37}', Some(55), Some(55), Some(55)),
    ("six", '\u{36}', Some(54), Some(54), Some(54)),
    ("slash", '\u{2f}', Some(47), Some(47), Some(47)),
    ("space", '\u{20}', Some(32), Some(32), Some(32)),
    ("sterling", '\u{a3}', Some(163), Some(163), Some(163)),
    ("t", '\u{74}', Some(116), Some(116), Some(116)),
    ("thorn", '\u{fe}', None, None, Some(254)),
    ("three", '\u{33}', Some(51), Some(51), Some(51)),
    ("threequarters", '\u{be}', None, None, Some(190)),
    ("threesuperior", '\u{b3}', None, None, Some(179)),
    ("tilde", '\u{2dc}', Some(196), Some(247), Some(152)),
    ("trademark", '\u{2122}', None, Some(170), Some(153)),
    ("two", '\u{32}', Some(50), Some(50), Some(50)),
    ("twosuperior", '\u{b2}', None, None, Some(178)),
    ("u", '\u{75}', Some(117), Some(117), Some(117)),
    ("uacute", '\u{fa}', None, Some(156), Some(250)),
    ("ucircumflex", '\u{fb}', None, Some(158), Some(251)),
    ("udieresis", '\u{fc}', None, Some(159), Some(252)),
    ("ugrave", '\u{f9}', None, Some(157), Some(249)),
    ("underscore", '\u{5f}', Some(95), Some(95), Some(95)),
    ("v", '\u{76}', Some(118), Some(118), Some(118)),
    ("w", '\u{77}', Some(119), Some(119), Some(119)),
    ("x", '\u{78}', Some(120), Some(120), Some(120)),
    ("y", '\u{79}', Some(121), Some(121), Some(121)),
    ("yacute", '\u{fd}', None, None, Some(253)),
    ("ydieresis", '\u{ff}', None, Some(216), Some(255)),
    ("yen", '\u{a5}', Some(165), Some(180), Some(165)),
    ("z", '\u{7a}', Some(122), Some(122), Some(122)),
    ("zcaron", '\u{17e}', None, None, Some(158)),
    ("zero", '\u{30}', Some(48), Some(48), Some(48)),
];

/// Code-to-glyph-name table of one simple encoding.
pub type NameTable = [Option<&'static str>; 256];

fn table(column: impl Fn(&LatinRow) -> Option<u8>) -> NameTable {
    let mut names = [None; 256];
    for row in LATIN_CHARSET {
        if let Some(code) = column(row) {
            names[usize::from(code)] = Some(row.0);
        }
    }
    names
}

lazy_static! {
    pub static ref STANDARD: NameTable = table(|r| r.2);
    pub static ref MAC_ROMAN: NameTable = table(|r| r.3);
    pub static ref WIN_ANSI: NameTable = table(|r| r.4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodings_disagree_where_expected() {
        assert_eq!(STANDARD[0x27], Some("quoteright"));
        assert_eq!(WIN_ANSI[0x27], Some("quotesingle"));
        assert_eq!(MAC_ROMAN[0x80], Some("Adieresis"));
        assert_eq!(WIN_ANSI[0x80], Some("Euro"));
        assert_eq!(STANDARD[0xA0], None);
        assert_eq!(WIN_ANSI[0xA0], Some("nbspace"));
    }
}
