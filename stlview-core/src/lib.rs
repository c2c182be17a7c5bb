//! stlview core library
//!
//! Loads binary and ASCII STL files into a validated, in-memory triangle list
//! and provides the in-place transforms applied after loading (centering,
//! unit scaling, 90 degree rotations).

pub mod error;
pub mod geometry;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use error::{LoadError, LoadResult};
pub use geometry::{BoundingBox, Facet, Mesh};
pub use stl::{StlFormat, StlLoader};
pub use transform::{Axis, RotationState, Transform};
