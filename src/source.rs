//! Reading CSV input from disk, with transparent decompression.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::CompressionFormat;

/// Compression for `path`: the explicit choice, else the file extension, else none.
pub fn detect_compression(
    path: &Path,
    explicit: Option<CompressionFormat>,
) -> Option<CompressionFormat> {
    explicit.or_else(|| CompressionFormat::from_extension(path))
}

/// Reads the whole file into memory, decompressing it when compressed.
pub fn read_source(path: &Path, compression: Option<CompressionFormat>) -> Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| eyre!("Failed to open {}: {}", path.display(), e))?;
    let compression = detect_compression(path, compression);

    let mut reader: Box<dyn Read> = match compression {
        None => Box::new(BufReader::new(file)),
        Some(CompressionFormat::Gzip) => {
            Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(file)))
        }
        Some(CompressionFormat::Zstd) => Box::new(zstd::Decoder::new(file)?),
        Some(CompressionFormat::Bzip2) => {
            Box::new(bzip2::read::MultiBzDecoder::new(BufReader::new(file)))
        }
        Some(CompressionFormat::Xz) => Box::new(xz2::read::XzDecoder::new(BufReader::new(file))),
    };

    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| {
        eyre!(
            "Failed to read {}{}: {}",
            path.display(),
            compression
                .map(|c| format!(" as {} data", c.extension()))
                .unwrap_or_default(),
            e
        )
    })?;

    tracing::debug!(
        path = %path.display(),
        compression = compression.map(|c| c.extension()),
        bytes = bytes.len(),
        "read input file"
    );
    Ok(bytes)
}
