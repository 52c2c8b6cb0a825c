use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;

/// Input compression codecs, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gz,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detects the codec from the path extension; anything unrecognized is
    /// read as plain text.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some("gz") | Some("bgz") => Compression::Gz,
            Some("bz2") => Compression::Bzip2,
            Some("xz") => Compression::Xz,
            Some("zst") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Compression::None => "none",
            Compression::Gz => "gzip",
            Compression::Bzip2 => "bzip2",
            Compression::Xz => "xz",
            Compression::Zstd => "zstd",
        }
    }

    /// Wraps an open file in the matching streaming decoder. Multi-member
    /// decoders are used where the format allows them, so bgzip-style
    /// concatenated files decode in full.
    pub fn reader(
        &self,
        handle: File,
    ) -> anyhow::Result<Box<dyn BufRead>> {
        Ok(match self {
            Compression::None => Box::new(BufReader::new(handle)),
            Compression::Gz => {
                Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(handle)))
            },
            Compression::Bzip2 => {
                Box::new(BufReader::new(bzip2::read::MultiBzDecoder::new(handle)))
            },
            Compression::Xz => {
                Box::new(BufReader::new(xz2::read::XzDecoder::new_multi_decoder(
                    handle,
                )))
            },
            Compression::Zstd => Box::new(BufReader::new(zstd::Decoder::new(handle)?)),
        })
    }
}

/// Whether the path carries an extension the strict open policy accepts:
/// plain `.txt` reports or any supported codec.
pub fn is_recognized(path: &Path) -> bool {
    Compression::detect(path) != Compression::None
        || path.extension().and_then(OsStr::to_str) == Some("txt")
}

/// Opens a report file for line reading with transparent decompression.
pub fn open_report(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    let handle = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Compression::detect(path).reader(handle)
}
