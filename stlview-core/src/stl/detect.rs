//! Encoding detection and triangle pre-count
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, trace};

use super::ascii::contains_ignore_case;
use super::{StlFormat, BINARY_DATA_START, BINARY_FACET_SIZE, BINARY_HEADER_SIZE, MIN_ASCII_SIZE};
use crate::error::{LoadError, LoadResult};

/// Outcome of probing a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub format: StlFormat,
    /// Triangles implied by the file; zero unless `format` is binary or ascii
    pub triangles: u32,
    pub file_size: u64,
}

/// Classify the file at `path` without decoding any geometry.
///
/// Fails only when the file can't be opened.
pub fn detect(path: &Path) -> LoadResult<Detection> {
    let file = File::open(path).map_err(|source| LoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let detection = detect_reader(&mut BufReader::new(file));
    debug!(
        path = %path.display(),
        size = detection.file_size,
        format = %detection.format,
        triangles = detection.triangles,
        "detected file format"
    );
    Ok(detection)
}

/// Classify an open stream, rewinding it between probes
pub fn detect_reader<R: BufRead + Seek>(reader: &mut R) -> Detection {
    let file_size = reader.seek(SeekFrom::End(0)).unwrap_or_else(|err| {
        trace!(%err, "can't determine file size");
        0
    });
    let unknown = Detection {
        format: StlFormat::Unknown,
        triangles: 0,
        file_size,
    };

    if file_size < MIN_ASCII_SIZE {
        debug!(file_size, "file smaller than {} bytes", MIN_ASCII_SIZE);
        return unknown;
    }

    if let Some(triangles) = probe_ascii(reader) {
        return Detection {
            format: StlFormat::Ascii,
            triangles,
            ..unknown
        };
    }

    if file_size < BINARY_DATA_START {
        debug!(file_size, "file smaller than the binary header");
        return unknown;
    }

    match probe_binary(reader, file_size) {
        Some(triangles) => Detection {
            format: StlFormat::Binary,
            triangles,
            ..unknown
        },
        None => {
            debug!("neither ASCII nor binary STL file");
            unknown
        }
    }
}

/// `Some(count)` when the first line opens a solid and some later line closes it
fn probe_ascii<R: BufRead + Seek>(reader: &mut R) -> Option<u32> {
    reader.rewind().ok()?;

    let mut line = Vec::new();
    if !matches!(reader.read_until(b'\n', &mut line), Ok(n) if n > 0) {
        trace!("can't read first line");
        return None;
    }
    if !line
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case(b"solid "))
    {
        trace!("file header 'solid ' not found");
        return None;
    }

    let mut triangles: u32 = 0;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                trace!(triangles, "end of file before 'endsolid'");
                return None;
            }
            Err(err) => {
                trace!(%err, "file reading error");
                return None;
            }
            Ok(_) => {}
        }

        if contains_ignore_case(&line, b"endsolid") {
            trace!(triangles, "file footer 'endsolid' found");
            return Some(triangles);
        }
        if contains_ignore_case(&line, b"facet normal") {
            triangles = triangles.saturating_add(1);
        }
    }
}

/// `Some(count)` when header, count word and records add up to the file size exactly
fn probe_binary<R: Read + Seek>(reader: &mut R, file_size: u64) -> Option<u32> {
    if let Err(err) = reader.seek(SeekFrom::Start(BINARY_HEADER_SIZE as u64)) {
        trace!(%err, "file seek error");
        return None;
    }

    let mut count = [0u8; 4];
    if let Err(err) = reader.read_exact(&mut count) {
        trace!(%err, "can't read triangle count");
        return None;
    }
    let triangles = u32::from_le_bytes(count);

    let expected = BINARY_DATA_START + u64::from(triangles) * BINARY_FACET_SIZE as u64;
    if expected == file_size {
        trace!(triangles, "binary layout matches file size");
        Some(triangles)
    } else {
        trace!(triangles, expected, file_size, "file size doesn't fit triangle count");
        None
    }
}
