//! STL loading for binary and ASCII files
//!
//! [`StlLoader::load_file`] detects the encoding, sizes the mesh's facet
//! buffer from the detected triangle count and decodes into it. A load either
//! fills the mesh completely or leaves its facet buffer empty.
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{debug, trace, Dispatch};

use crate::error::{LoadError, LoadResult};
use crate::geometry::{Facet, Mesh};

pub mod ascii;
pub mod binary;
pub mod detect;
pub mod number;
pub mod writer;

pub use detect::{detect, detect_reader, Detection};
pub use writer::{save_ascii, save_binary, write_ascii, write_binary};

/// Binary header, also used as the model name
pub const BINARY_HEADER_SIZE: usize = 80;
/// Header plus the little-endian triangle count
pub const BINARY_DATA_START: u64 = 84;
/// Normal, three corners and the attribute word
pub const BINARY_FACET_SIZE: usize = 50;
/// Smallest possible ASCII file, `"solid \nendsolid\n"`
pub const MIN_ASCII_SIZE: u64 = 15;

/// Encoding of an STL file as classified by [`detect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Binary,
    Ascii,
    /// Neither encoding; must be rejected before decoding
    Unknown,
}

impl fmt::Display for StlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Binary => "binary",
            Self::Ascii => "ascii",
            Self::Unknown => "unknown",
        })
    }
}

/// Resize `facets` to exactly `triangles` default entries.
///
/// A count of zero leaves the buffer empty; the decoder reports that case.
pub fn allocate(facets: &mut Vec<Facet>, triangles: u32) -> LoadResult<()> {
    facets.clear();
    trace!(triangles, "allocating memory for facets");
    if triangles == 0 {
        trace!("not allocating memory - 0 triangles");
        return Ok(());
    }

    let len = usize::try_from(triangles).map_err(|_| LoadError::MemAlloc { triangles })?;
    facets.try_reserve_exact(len).map_err(|err| {
        debug!(%err, triangles, "can't allocate memory");
        LoadError::MemAlloc { triangles }
    })?;
    facets.resize(len, Facet::default());
    Ok(())
}

/// Loads STL files into caller-owned meshes.
///
/// Remembers the format and triangle count of the most recent load; both are
/// reset when the next load starts.
#[derive(Debug, Clone, Default)]
pub struct StlLoader {
    format: Option<StlFormat>,
    triangles: u32,
    dispatch: Option<Dispatch>,
}

impl StlLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader whose diagnostic events go to `dispatch` instead of the default subscriber
    pub fn with_dispatch(dispatch: Dispatch) -> Self {
        Self {
            dispatch: Some(dispatch),
            ..Self::default()
        }
    }

    /// Format found by the last detection, `None` before any file was checked
    pub fn file_format(&self) -> Option<StlFormat> {
        self.format
    }

    /// Triangle count of the last successful load (0 after a failure)
    pub fn triangle_count(&self) -> u32 {
        self.triangles
    }

    /// Load `path` into `mesh`, replacing its facets and name.
    ///
    /// On any error the mesh's facet buffer is left empty.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P, mesh: &mut Mesh) -> LoadResult<()> {
        let path = path.as_ref();
        match self.dispatch.clone() {
            Some(dispatch) => {
                tracing::dispatcher::with_default(&dispatch, || self.load(path, mesh))
            }
            None => self.load(path, mesh),
        }
    }

    fn load(&mut self, path: &Path, mesh: &mut Mesh) -> LoadResult<()> {
        self.format = None;
        self.triangles = 0;
        mesh.facets.clear();

        let result = self.detect_and_decode(path, mesh);
        if let Err(err) = &result {
            debug!(path = %path.display(), code = err.code(), %err, "load failed");
            mesh.facets.clear();
            self.triangles = 0;
        }
        result
    }

    fn detect_and_decode(&mut self, path: &Path, mesh: &mut Mesh) -> LoadResult<()> {
        let detection = detect(path)?;
        self.format = Some(detection.format);
        self.triangles = detection.triangles;

        match detection.format {
            StlFormat::Unknown => Err(LoadError::InvalidStlFile),
            StlFormat::Binary => {
                allocate(&mut mesh.facets, self.triangles)?;
                self.decode(path, mesh, |reader, facets| binary::decode(reader, facets))
            }
            StlFormat::Ascii => {
                allocate(&mut mesh.facets, self.triangles)?;
                self.decode(path, mesh, |reader, facets| ascii::decode(reader, facets))
            }
        }
    }

    /// Checks shared by both decoders, then runs `decoder` over the opened file
    fn decode<F>(&self, path: &Path, mesh: &mut Mesh, decoder: F) -> LoadResult<()>
    where
        F: FnOnce(&mut BufReader<File>, &mut [Facet]) -> LoadResult<String>,
    {
        if self.triangles == 0 {
            debug!("file contains empty model");
            return Err(LoadError::EmptyModel);
        }

        let allocated = mesh.facets.len();
        debug_assert_eq!(allocated, self.triangles as usize, "facet buffer not sized by allocate");
        if allocated != self.triangles as usize {
            return Err(LoadError::InternalMismatch {
                allocated,
                expected: self.triangles,
            });
        }

        let file = File::open(path).map_err(|source| LoadError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        trace!(path = %path.display(), "decoding");
        mesh.name = decoder(&mut reader, &mut mesh.facets)?;
        debug!(facets = mesh.facets.len(), name = %mesh.name, "model loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_exact_length() {
        let mut facets = vec![Facet::default(); 7];
        allocate(&mut facets, 3).unwrap();
        assert_eq!(facets.len(), 3);

        allocate(&mut facets, 0).unwrap();
        assert!(facets.is_empty());
    }

    #[test]
    fn test_fresh_loader_has_not_checked() {
        let loader = StlLoader::new();
        assert_eq!(loader.file_format(), None);
        assert_eq!(loader.triangle_count(), 0);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(StlFormat::Binary.to_string(), "binary");
        assert_eq!(StlFormat::Unknown.to_string(), "unknown");
    }
}
