//! Error type for STL loading
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for loader operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Every way a load can fail.
///
/// Each variant maps to a stable numeric code (see [`LoadError::code`]) so a
/// presentation layer can report errors it does not translate.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("STL file is neither ASCII nor binary")]
    InvalidStlFile,

    #[error("file not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can't allocate memory for {triangles} facets")]
    MemAlloc { triangles: u32 },

    #[error("non-finite vertex coordinate in facet {facet} at byte {offset}")]
    TriangleDef { facet: usize, offset: u64 },

    #[error("read error at byte {offset}")]
    ReadFile {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("can't seek past the triangle count")]
    SeekFile(#[source] io::Error),

    #[error("can't open {}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("facet buffer holds {allocated} entries but {expected} were detected")]
    InternalMismatch { allocated: usize, expected: u32 },

    #[error("file contains an empty model")]
    EmptyModel,

    #[error("line {line}: can't read facet line")]
    FacetLineUnreadable { line: u32 },

    #[error("line {line}: 'endsolid' expected")]
    EndsolidExpected { line: u32 },

    #[error("line {line}: can't read the 'endsolid' line")]
    EndsolidUnreadable { line: u32 },

    #[error("line 1: can't read the 'solid' line")]
    SolidUnreadable,

    #[error("line 1: 'solid ' expected")]
    SolidExpected,

    #[error("line {line}: '{expected}' expected")]
    UnexpectedKeyword { line: u32, expected: &'static str },

    #[error("line {line}: can't read '{header}' line")]
    VectorLineUnreadable { line: u32, header: &'static str },

    #[error("line {line}: '{header}' expected")]
    VectorHeaderMissing { line: u32, header: &'static str },

    /// No number starts after the header or the previous field.
    #[error("line {line}: number {field} after '{header}' expected")]
    NumberMissing {
        line: u32,
        header: &'static str,
        field: u8,
    },

    /// A number is not followed by the space separating it from the next one.
    #[error("line {line}: number {next} after '{header}' expected", next = .field + 1)]
    NumberUnterminated {
        line: u32,
        header: &'static str,
        field: u8,
    },

    #[error("line {line}: number {field} '{token}' is not a float")]
    ConvertToFloat { line: u32, field: u8, token: String },
}

impl LoadError {
    /// Stable numeric code, matching the historical error table
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidStlFile => 13,
            Self::FileNotFound { .. } => 14,
            Self::MemAlloc { .. } => 16,
            Self::TriangleDef { .. } => 17,
            Self::ReadFile { .. } => 18,
            Self::SeekFile(_) => 19,
            Self::OpenFile { .. } => 20,
            Self::InternalMismatch { .. } => 21,
            Self::EmptyModel => 22,
            Self::FacetLineUnreadable { .. } => 23,
            Self::EndsolidExpected { .. } => 24,
            Self::EndsolidUnreadable { .. } => 25,
            Self::SolidUnreadable => 26,
            Self::SolidExpected => 27,
            Self::UnexpectedKeyword { .. } => 28,
            Self::VectorLineUnreadable { .. } => 29,
            Self::VectorHeaderMissing { .. } => 30,
            Self::NumberMissing { field, .. } => match field {
                1 => 31,
                2 => 33,
                _ => 35,
            },
            Self::NumberUnterminated { field, .. } => match field {
                1 => 32,
                _ => 34,
            },
            Self::ConvertToFloat { .. } => 36,
        }
    }

    /// Errors an end user can act on directly
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidStlFile | Self::FileNotFound { .. } | Self::MemAlloc { .. }
        )
    }

    /// 1-based line of an ASCII grammar failure, if the error has one
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::SolidUnreadable | Self::SolidExpected => Some(1),
            Self::FacetLineUnreadable { line }
            | Self::EndsolidExpected { line }
            | Self::EndsolidUnreadable { line }
            | Self::UnexpectedKeyword { line, .. }
            | Self::VectorLineUnreadable { line, .. }
            | Self::VectorHeaderMissing { line, .. }
            | Self::NumberMissing { line, .. }
            | Self::NumberUnterminated { line, .. }
            | Self::ConvertToFloat { line, .. } => Some(*line),
            _ => None,
        }
    }
}
