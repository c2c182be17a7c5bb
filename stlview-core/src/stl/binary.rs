//! Binary STL decoder
use std::io::{Read, Seek, SeekFrom};

use nalgebra::{Point3, Vector3};
use tracing::trace;

use super::{BINARY_DATA_START, BINARY_FACET_SIZE, BINARY_HEADER_SIZE};
use crate::error::{LoadError, LoadResult};
use crate::geometry::Facet;

/// Model name stored in the 80-byte header, up to the first NUL
pub(crate) fn header_name(header: &[u8]) -> String {
    let end = header.iter().position(|&b| b == 0).unwrap_or(header.len());
    String::from_utf8_lossy(&header[..end]).into_owned()
}

/// Decode one 50-byte record: normal, three corners, attribute word
fn parse_record(record: &[u8; BINARY_FACET_SIZE]) -> Facet {
    let float = |at: usize| {
        f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
    };
    let point = |at: usize| Point3::new(float(at), float(at + 4), float(at + 8));

    Facet {
        normal: Vector3::new(float(0), float(4), float(8)),
        vertices: [point(12), point(24), point(36)],
        attribute: u16::from_le_bytes([record[48], record[49]]),
    }
}

/// Fill `facets` from a binary STL stream positioned at its start and return
/// the header as the model name.
///
/// The triangle count word is skipped; the caller sizes `facets` from it.
pub fn decode<R: Read + Seek>(reader: &mut R, facets: &mut [Facet]) -> LoadResult<String> {
    let mut header = [0u8; BINARY_HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|source| {
        trace!(%source, "can't read header");
        LoadError::ReadFile { offset: 0, source }
    })?;
    let name = header_name(&header);

    reader.seek(SeekFrom::Current(4)).map_err(|source| {
        trace!(%source, "file seek error");
        LoadError::SeekFile(source)
    })?;

    let mut offset = BINARY_DATA_START;
    let mut record = [0u8; BINARY_FACET_SIZE];
    for (index, facet) in facets.iter_mut().enumerate() {
        reader.read_exact(&mut record).map_err(|source| {
            trace!(offset, %source, "can't read facet record");
            LoadError::ReadFile { offset, source }
        })?;

        let parsed = parse_record(&record);
        if !parsed.is_finite() {
            trace!(offset, facet = index, "data error: non-finite vertex");
            return Err(LoadError::TriangleDef {
                facet: index,
                offset,
            });
        }
        *facet = parsed;
        offset += BINARY_FACET_SIZE as u64;
    }

    trace!(facets = facets.len(), name = %name, "binary model decoded");
    Ok(name)
}
