//! Undo PNG and TIFF predictors applied before Flate/LZW compression.

use crate::error::{PdfError, Result};
use crate::model::objects::PDFDict;

/// Predictor settings from a `/DecodeParms` dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictorParams {
    pub predictor: i64,
    pub colors: usize,
    pub bits_per_component: usize,
    pub columns: usize,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

impl PredictorParams {
    pub fn from_dict(parms: Option<&PDFDict>) -> Self {
        let mut params = Self::default();
        let Some(parms) = parms else {
            return params;
        };
        let int = |key: &str| parms.get(key).and_then(|v| v.as_int().ok());
        // Out-of-range values saturate here and are rejected by `depredict`.
        let count = |n: i64| usize::try_from(n.max(1)).unwrap_or(usize::MAX);
        if let Some(p) = int("Predictor") {
            params.predictor = p;
        }
        if let Some(c) = int("Colors") {
            params.colors = count(c);
        }
        if let Some(b) = int("BitsPerComponent") {
            params.bits_per_component = count(b);
        }
        if let Some(c) = int("Columns") {
            params.columns = count(c);
        }
        params
    }
}

/// Reverse the predictor described by `params`.
pub fn depredict(data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    match params.predictor {
        1 => Ok(data),
        2 => tiff_depredict(data, params),
        10..=15 => png_depredict(&data, params),
        other => Err(PdfError::unsupported(format!("predictor {other}"))),
    }
}

fn tiff_depredict(mut data: Vec<u8>, params: &PredictorParams) -> Result<Vec<u8>> {
    if params.bits_per_component != 8 {
        return Err(PdfError::unsupported(format!(
            "TIFF predictor with {} bits per component",
            params.bits_per_component
        )));
    }
    let row_len = params
        .colors
        .checked_mul(params.columns)
        .filter(|&n| n <= data.len().max(1))
        .ok_or_else(|| oversized_row(params))?;
    for row in data.chunks_mut(row_len) {
        for i in params.colors..row.len() {
            row[i] = row[i].wrapping_add(row[i - params.colors]);
        }
    }
    Ok(data)
}

fn oversized_row(params: &PredictorParams) -> PdfError {
    PdfError::malformed(format!(
        "predictor row of {} columns x {} colors x {} bits does not fit the stream",
        params.columns, params.colors, params.bits_per_component
    ))
}

/// Each row carries a leading filter-type byte.
fn png_depredict(data: &[u8], params: &PredictorParams) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let pixel_bits = params
        .colors
        .checked_mul(params.bits_per_component)
        .ok_or_else(|| oversized_row(params))?;
    let row_bytes = pixel_bits
        .checked_mul(params.columns)
        .map(|bits| bits.div_ceil(8))
        .filter(|&n| n <= data.len())
        .ok_or_else(|| oversized_row(params))?;
    let bpp = std::cmp::max(1, pixel_bits / 8);
    let row_size = row_bytes + 1;

    let mut result = Vec::with_capacity(data.len());
    let mut prev_row = vec![0u8; row_bytes];

    for chunk in data.chunks(row_size) {
        if chunk.len() < row_size {
            break;
        }
        let filter_type = chunk[0];
        let row_data = &chunk[1..];
        let mut current_row = vec![0u8; row_bytes];

        for i in 0..row_bytes {
            let left = if i >= bpp { current_row[i - bpp] } else { 0 };
            let above = prev_row[i];
            let upper_left = if i >= bpp { prev_row[i - bpp] } else { 0 };
            let prediction = match filter_type {
                1 => left,
                2 => above,
                3 => ((u16::from(left) + u16::from(above)) / 2) as u8,
                4 => paeth_predictor(left, above, upper_left),
                _ => 0,
            };
            current_row[i] = row_data[i].wrapping_add(prediction);
        }

        result.extend_from_slice(&current_row);
        prev_row = current_row;
    }

    Ok(result)
}

/// Paeth predictor function used in PNG filtering.
const fn paeth_predictor(left: u8, above: u8, upper_left: u8) -> u8 {
    let a = left as i32;
    let b = above as i32;
    let c = upper_left as i32;
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}
