//! CSV input plumbing: delimiter resolution, encoding fallback, reader
//! construction.
//!
//! ERP exports arrive as UTF-8 or windows-1252 depending on which machine
//! produced them. Input is decoded as UTF-8 first and re-decoded as cp1252
//! when that fails, mirroring what the upstream loader always did.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;
use log::debug;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// The `-` path convention routes input through stdin.
pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Read the whole input as text, falling back from UTF-8 to windows-1252.
pub fn read_input_text(path: &Path) -> Result<String> {
    let bytes = if is_dash(path) {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("Reading input from stdin")?;
        buf
    } else {
        fs::read(path).with_context(|| format!("Opening input file {path:?}"))?
    };
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            debug!("Input {path:?} is not valid UTF-8; decoding as windows-1252");
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

pub fn csv_reader_from_text(text: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(text.as_bytes())
}
