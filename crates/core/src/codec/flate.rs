//! FlateDecode (zlib) with a lenient fallback for damaged streams.

use crate::error::{PdfError, Result};
use flate2::{Decompress, FlushDecompress, Status};
use std::io::Read;
use tracing::warn;

pub fn flatedecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(err) => {
            let partial = decompress_corrupted(data);
            if partial.is_empty() {
                return Err(PdfError::DecodeError {
                    filter: "FlateDecode",
                    msg: err.to_string(),
                });
            }
            warn!(error = %err, recovered = partial.len(), "damaged flate stream, keeping prefix");
            Ok(partial)
        }
    }
}

/// Feed the decoder one byte at a time and keep whatever comes out before
/// the first error. A byte stays pending until the decoder takes it, so
/// output larger than the window drains over several calls.
fn decompress_corrupted(data: &[u8]) -> Vec<u8> {
    drain_bytewise(data, &mut [0u8; 4096])
}

fn drain_bytewise(data: &[u8], buf: &mut [u8]) -> Vec<u8> {
    let mut decoder = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0usize;
    loop {
        let input = &data[i..data.len().min(i + 1)];
        let before_out = decoder.total_out();
        let before_in = decoder.total_in();
        let res = decoder.decompress(input, buf, FlushDecompress::None);
        let produced = (decoder.total_out() - before_out) as usize;
        out.extend_from_slice(&buf[..produced]);
        let consumed = (decoder.total_in() - before_in) as usize;
        i += consumed;
        match res {
            Ok(Status::StreamEnd) | Err(_) => break,
            Ok(_) if consumed == 0 && produced == 0 => break,
            Ok(_) => {}
        }
    }
    out
}
