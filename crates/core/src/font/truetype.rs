//! Advance widths from an embedded TrueType program (`/FontFile2`).
//!
//! Only the tables needed to measure a glyph are read: `head` for the em
//! size, `hhea` and `hmtx` for advances, and `cmap` to get from a character
//! code to a glyph id.

use crate::error::{PdfError, Result};
use byteorder::{BigEndian, ByteOrder};
use rustc_hash::FxHashMap;

/// Glyph advances of one font program.
#[derive(Debug, Clone)]
pub struct TrueTypeMetrics {
    units_per_em: u16,
    advances: Vec<u16>,
    /// character code -> glyph id
    cmap: FxHashMap<u32, u16>,
}

impl TrueTypeMetrics {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let tables = table_directory(data)?;
        let head = table(data, &tables, b"head")?;
        let hhea = table(data, &tables, b"hhea")?;
        let hmtx = table(data, &tables, b"hmtx")?;
        if head.len() < 20 || hhea.len() < 36 {
            return Err(bad("truncated head or hhea table"));
        }
        let units_per_em = BigEndian::read_u16(&head[18..]);
        let metric_count = usize::from(BigEndian::read_u16(&hhea[34..]));
        let advances = hmtx
            .chunks_exact(4)
            .take(metric_count)
            .map(BigEndian::read_u16)
            .collect();
        let cmap = match table(data, &tables, b"cmap") {
            Ok(cmap) => read_cmap(cmap),
            Err(_) => FxHashMap::default(),
        };
        Ok(Self {
            units_per_em,
            advances,
            cmap,
        })
    }

    /// Width of a character code in thousandths of an em.
    pub fn glyph_width(&self, code: u32) -> Option<f64> {
        let gid = if self.cmap.is_empty() {
            u16::try_from(code).ok()?
        } else {
            // Symbolic fonts map their codes into U+F000..U+F0FF.
            *self
                .cmap
                .get(&code)
                .or_else(|| code.checked_add(0xF000).and_then(|c| self.cmap.get(&c)))?
        };
        // Glyphs past the last long metric share its advance.
        let advance = self
            .advances
            .get(usize::from(gid))
            .or_else(|| self.advances.last())?;
        if self.units_per_em == 0 {
            return None;
        }
        Some(f64::from(*advance) * 1000.0 / f64::from(self.units_per_em))
    }
}

fn bad(msg: &str) -> PdfError {
    PdfError::DecodeError {
        filter: "FontFile2",
        msg: msg.to_string(),
    }
}

fn table_directory(data: &[u8]) -> Result<FxHashMap<[u8; 4], (usize, usize)>> {
    if data.len() < 12 {
        return Err(bad("font program too short"));
    }
    let count = usize::from(BigEndian::read_u16(&data[4..]));
    let mut tables = FxHashMap::default();
    for entry in data[12..].chunks_exact(16).take(count) {
        let tag = [entry[0], entry[1], entry[2], entry[3]];
        let offset = BigEndian::read_u32(&entry[8..]) as usize;
        let length = BigEndian::read_u32(&entry[12..]) as usize;
        tables.insert(tag, (offset, length));
    }
    Ok(tables)
}

fn table<'a>(
    data: &'a [u8],
    tables: &FxHashMap<[u8; 4], (usize, usize)>,
    tag: &[u8; 4],
) -> Result<&'a [u8]> {
    let (offset, length) = tables
        .get(tag)
        .copied()
        .ok_or_else(|| bad("missing table"))?;
    data.get(offset..offset.saturating_add(length))
        .ok_or_else(|| bad("table runs past the end of the font"))
}

/// Reads every Unicode or symbol subtable in formats 0 and 4.
fn read_cmap(cmap: &[u8]) -> FxHashMap<u32, u16> {
    let mut out = FxHashMap::default();
    if cmap.len() < 4 {
        return out;
    }
    let count = usize::from(BigEndian::read_u16(&cmap[2..]));
    for record in cmap[4..].chunks_exact(8).take(count) {
        let platform = BigEndian::read_u16(record);
        let encoding = BigEndian::read_u16(&record[2..]);
        if !(platform == 0 || (platform == 3 && matches!(encoding, 0 | 1 | 10))) {
            continue;
        }
        let offset = BigEndian::read_u32(&record[4..]) as usize;
        let Some(sub) = cmap.get(offset..) else {
            continue;
        };
        if sub.len() < 6 {
            continue;
        }
        match BigEndian::read_u16(sub) {
            0 => {
                if let Some(ids) = sub.get(6..262) {
                    for (code, gid) in ids.iter().enumerate() {
                        out.insert(code as u32, u16::from(*gid));
                    }
                }
            }
            4 => read_format_4(sub, &mut out),
            _ => {}
        }
    }
    out
}

fn read_format_4(sub: &[u8], out: &mut FxHashMap<u32, u16>) {
    if sub.len() < 14 {
        return;
    }
    let segs = usize::from(BigEndian::read_u16(&sub[6..]) / 2);
    let ends = 14;
    let starts = ends + segs * 2 + 2;
    let deltas = starts + segs * 2;
    let range_offsets = deltas + segs * 2;
    if sub.len() < range_offsets + segs * 2 {
        return;
    }
    let at = |pos: usize| BigEndian::read_u16(&sub[pos..]);
    for i in 0..segs {
        let end = at(ends + i * 2);
        let start = at(starts + i * 2);
        let delta = at(deltas + i * 2);
        let ro_pos = range_offsets + i * 2;
        let range_offset = usize::from(at(ro_pos));
        if start > end || start == 0xFFFF {
            continue;
        }
        for c in start..=end {
            let gid = if range_offset == 0 {
                c.wrapping_add(delta)
            } else {
                let pos = ro_pos + range_offset + usize::from(c - start) * 2;
                match sub.get(pos..pos + 2) {
                    Some(b) if BigEndian::read_u16(b) != 0 => {
                        BigEndian::read_u16(b).wrapping_add(delta)
                    }
                    _ => 0,
                }
            };
            out.insert(u32::from(c), gid);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A minimal font: 2000 units per em, three glyphs, and a format 4 cmap
    /// sending 'A'..='B' to glyphs 1..=2.
    pub(crate) fn tiny_font() -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[18..20].copy_from_slice(&2000u16.to_be_bytes());
        let mut hhea = vec![0u8; 36];
        hhea[34..36].copy_from_slice(&2u16.to_be_bytes());
        let mut hmtx = Vec::new();
        for (adv, lsb) in [(1000u16, 0u16), (1334, 0)] {
            hmtx.extend_from_slice(&adv.to_be_bytes());
            hmtx.extend_from_slice(&lsb.to_be_bytes());
        }
        hmtx.extend_from_slice(&0u16.to_be_bytes());

        let mut sub = Vec::new();
        for v in [4u16, 32, 0, 4, 0, 0, 0] {
            sub.extend_from_slice(&v.to_be_bytes());
        }
        for v in [0x42u16, 0xFFFF, 0, 0x41, 0xFFFF, 0xFFC0, 1, 0, 0] {
            sub.extend_from_slice(&v.to_be_bytes());
        }
        let mut cmap = Vec::new();
        for v in [0u16, 1, 3, 1] {
            cmap.extend_from_slice(&v.to_be_bytes());
        }
        cmap.extend_from_slice(&12u32.to_be_bytes());
        cmap.extend_from_slice(&sub);

        let tables: [(&[u8; 4], &[u8]); 4] =
            [(b"cmap", &cmap), (b"head", &head), (b"hhea", &hhea), (b"hmtx", &hmtx)];
        let mut font = vec![0, 1, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0];
        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in tables {
            font.extend_from_slice(tag);
            font.extend_from_slice(&[0; 4]);
            font.extend_from_slice(&(offset as u32).to_be_bytes());
            font.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(data);
            offset += data.len();
        }
        font.extend_from_slice(&body);
        font
    }

    #[test]
    fn widths_follow_cmap_and_em_size() {
        let metrics = TrueTypeMetrics::parse(&tiny_font()).unwrap();
        assert_eq!(metrics.glyph_width(0x41), Some(667.0));
        // glyph 2 is past the long metrics and reuses the last advance
        assert_eq!(metrics.glyph_width(0x42), Some(667.0));
        assert_eq!(metrics.glyph_width(0x43), None);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(TrueTypeMetrics::parse(b"nope").is_err());
    }
}
