//! STL encoders
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::BINARY_HEADER_SIZE;
use crate::geometry::Mesh;

/// Write `mesh` as binary STL.
///
/// The name fills the 80-byte header (truncated, NUL padded) and every facet
/// keeps its attribute word.
pub fn write_binary<W: Write>(mesh: &Mesh, mut writer: W) -> io::Result<()> {
    let mut header = [0u8; BINARY_HEADER_SIZE];
    let name = mesh.name().as_bytes();
    let len = name.len().min(BINARY_HEADER_SIZE);
    header[..len].copy_from_slice(&name[..len]);
    writer.write_all(&header)?;

    let count = u32::try_from(mesh.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "too many facets for binary STL")
    })?;
    writer.write_all(&count.to_le_bytes())?;

    for facet in mesh.facets() {
        for c in facet.normal.iter() {
            writer.write_all(&c.to_le_bytes())?;
        }
        for p in &facet.vertices {
            for c in p.iter() {
                writer.write_all(&c.to_le_bytes())?;
            }
        }
        writer.write_all(&facet.attribute.to_le_bytes())?;
    }
    writer.flush()
}

/// Write `mesh` as ASCII STL using shortest round-trip float formatting
pub fn write_ascii<W: Write>(mesh: &Mesh, mut writer: W) -> io::Result<()> {
    let name = mesh.name().lines().next().unwrap_or("");
    writeln!(writer, "solid {}", name)?;
    for facet in mesh.facets() {
        let n = &facet.normal;
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in &facet.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {}", name)?;
    writer.flush()
}

pub fn save_binary<P: AsRef<Path>>(mesh: &Mesh, path: P) -> io::Result<()> {
    write_binary(mesh, BufWriter::new(File::create(path)?))
}

pub fn save_ascii<P: AsRef<Path>>(mesh: &Mesh, path: P) -> io::Result<()> {
    write_ascii(mesh, BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stl::{BINARY_DATA_START, BINARY_FACET_SIZE};

    #[test]
    fn test_binary_layout() {
        let mesh = Mesh::cube(1.0);
        let mut out = Vec::new();
        write_binary(&mesh, &mut out).unwrap();
        assert_eq!(
            out.len() as u64,
            BINARY_DATA_START + 12 * BINARY_FACET_SIZE as u64
        );
        assert_eq!(&out[..4], b"cube");
        assert_eq!(&out[80..84], &12u32.to_le_bytes());
    }

    #[test]
    fn test_ascii_layout() {
        let mut mesh = Mesh::cube(2.0);
        mesh.facets_mut().truncate(1);
        let mut out = Vec::new();
        write_ascii(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "solid cube");
        assert_eq!(lines[1], "  facet normal 0e0 0e0 1e0");
        assert_eq!(lines[3], "      vertex -1e0 -1e0 1e0");
        assert_eq!(lines[8], "endsolid cube");
    }
}
