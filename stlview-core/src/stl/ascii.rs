//! ASCII STL decoder
//!
//! Line oriented; each structural line must hold exactly the expected keyword
//! (case-insensitive, optionally indented with spaces):
//!
//! ```text
//! solid <name>
//!   facet normal <fx> <fy> <fz>
//!     outer loop
//!       vertex <x> <y> <z>    (three times)
//!     endloop
//!   endfacet                  (once per detected triangle)
//! endsolid
//! ```
use std::io::BufRead;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::{tag_no_case, take_while},
    sequence::preceded,
    IResult,
};
use tracing::{trace, warn};

use super::number::parse_float;
use crate::error::{LoadError, LoadResult};
use crate::geometry::Facet;

const NORMAL_HEADER: &str = "facet normal ";
const VERTEX_HEADER: &str = "vertex ";

/// Case-insensitive substring search over raw bytes
pub(crate) fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// Match `keyword` after any run of spaces, returning what follows it
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(take_while(|c: char| c == ' '), tag_no_case(kw))
}

fn after_keyword<'a>(line: &'a str, kw: &'static str) -> Option<&'a str> {
    keyword(kw)(line).ok().map(|(rest, _)| rest)
}

/// Line source that tracks the 1-based number of the line last requested
struct Lines<R> {
    reader: R,
    line: u32,
    buf: Vec<u8>,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Next line without its terminator; `None` at end of file or on a read error
    fn next_line(&mut self) -> Option<String> {
        self.line += 1;
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                trace!(line = self.line, "unexpected end of file");
                None
            }
            Ok(_) => {
                let mut end = self.buf.len();
                while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
                    end -= 1;
                }
                Some(String::from_utf8_lossy(&self.buf[..end]).into_owned())
            }
            Err(err) => {
                trace!(line = self.line, %err, "can't read file");
                None
            }
        }
    }

    fn expect_keyword(&mut self, kw: &'static str) -> LoadResult<()> {
        let text = self
            .next_line()
            .ok_or(LoadError::FacetLineUnreadable { line: self.line })?;
        if after_keyword(&text, kw).is_none() {
            warn!(line = self.line, expected = kw, "unexpected keyword");
            return Err(LoadError::UnexpectedKeyword {
                line: self.line,
                expected: kw,
            });
        }
        Ok(())
    }

    /// Read `<header> <a> <b> <c>` where the numbers are separated by spaces
    fn read_triple(&mut self, header: &'static str) -> LoadResult<[f32; 3]> {
        let line = self.line + 1;
        let text = self
            .next_line()
            .ok_or(LoadError::VectorLineUnreadable { line, header })?;
        let rest = after_keyword(&text, header).ok_or_else(|| {
            trace!(line, header, "header expected");
            LoadError::VectorHeaderMissing { line, header }
        })?;

        let tokens = split_numbers(rest).map_err(|(field, terminated)| {
            trace!(line, header, field, "number expected");
            if terminated {
                LoadError::NumberMissing {
                    line,
                    header,
                    field,
                }
            } else {
                LoadError::NumberUnterminated {
                    line,
                    header,
                    field,
                }
            }
        })?;

        let mut values = [0.0f32; 3];
        for (field, (token, value)) in (1u8..).zip(tokens.iter().zip(values.iter_mut())) {
            *value = parse_float(token).ok_or_else(|| {
                trace!(line, header, field, token, "conversion to float failed");
                LoadError::ConvertToFloat {
                    line,
                    field,
                    token: (*token).to_string(),
                }
            })?;
        }
        Ok(values)
    }

    fn read_facet(&mut self, facet: &mut Facet) -> LoadResult<()> {
        let [nx, ny, nz] = self.read_triple(NORMAL_HEADER)?;
        facet.normal = Vector3::new(nx, ny, nz);
        self.expect_keyword("outer loop")?;
        for p in &mut facet.vertices {
            let [x, y, z] = self.read_triple(VERTEX_HEADER)?;
            *p = Point3::new(x, y, z);
        }
        self.expect_keyword("endloop")?;
        self.expect_keyword("endfacet")?;
        facet.attribute = 0;
        Ok(())
    }
}

/// Locate the three space-delimited number tokens of a vector line.
///
/// On failure returns the 1-based field and whether the search was for its
/// start (`true`) or for the space ending it (`false`).
fn split_numbers(rest: &str) -> Result<[&str; 3], (u8, bool)> {
    let mut tokens = [""; 3];
    let mut cursor = rest;
    for (field, token) in (1u8..).zip(tokens.iter_mut()) {
        let start = cursor.trim_start_matches(' ');
        if start.is_empty() {
            return Err((field, true));
        }
        if field == 3 {
            *token = start.trim_end_matches(' ');
        } else {
            let end = start.find(' ').ok_or((field, false))?;
            *token = &start[..end];
            cursor = &start[end..];
        }
    }
    Ok(tokens)
}

/// Fill `facets` from an ASCII STL stream and return the solid's name.
///
/// Expects exactly `facets.len()` facet blocks followed by `endsolid`.
pub fn decode<R: BufRead>(reader: R, facets: &mut [Facet]) -> LoadResult<String> {
    let mut lines = Lines::new(reader);

    let first = lines.next_line().ok_or(LoadError::SolidUnreadable)?;
    let name = tag_no_case::<_, _, nom::error::Error<&str>>("solid ")(first.as_str())
        .map(|(rest, _)| rest.to_string())
        .map_err(|_| {
            warn!(line = 1, "'solid ' expected");
            LoadError::SolidExpected
        })?;

    for facet in facets.iter_mut() {
        lines.read_facet(facet)?;
    }

    let last = lines
        .next_line()
        .ok_or(LoadError::EndsolidUnreadable { line: lines.line })?;
    if after_keyword(&last, "endsolid").is_none() {
        warn!(line = lines.line, "'endsolid' expected");
        return Err(LoadError::EndsolidExpected { line: lines.line });
    }

    trace!(facets = facets.len(), name = %name, "ASCII model decoded");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_FACET: &str = "solid X\n\
        facet normal 0 0 1\n\
          outer loop\n\
            vertex 0 0 0\n\
            vertex 1 0 0\n\
            vertex 0 1 0\n\
          endloop\n\
        endfacet\n\
        endsolid X\n";

    fn decode_str(text: &str, count: usize) -> LoadResult<(String, Vec<Facet>)> {
        let mut facets = vec![Facet::default(); count];
        let name = decode(text.as_bytes(), &mut facets)?;
        Ok((name, facets))
    }

    #[test]
    fn test_single_facet() {
        let (name, facets) = decode_str(ONE_FACET, 1).unwrap();
        assert_eq!(name, "X");
        assert_eq!(facets[0].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(*facets[0].p2(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_indentation_case_and_crlf() {
        let text = "SOLID Part\r\n   Facet Normal 1 0 0\r\n  OUTER LOOP\r\n    Vertex 1 2 3\r\n    vertex 4 5 6\r\n    vertex 7 8 9   \r\n  EndLoop\r\n EndFacet\r\n  EndSolid\r\n";
        let (name, facets) = decode_str(text, 1).unwrap();
        assert_eq!(name, "Part");
        assert_eq!(*facets[0].p3(), Point3::new(7.0, 8.0, 9.0));
    }

    #[test]
    fn test_empty_name() {
        let text = ONE_FACET.replacen("solid X", "solid ", 1);
        let (name, _) = decode_str(&text, 1).unwrap();
        assert_eq!(name, "");
    }

    #[test]
    fn test_second_field_not_a_number() {
        let text = ONE_FACET.replacen("vertex 1 0 0", "vertex 1.0 abc 3.0", 1);
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ConvertToFloat { line: 5, field: 2, ref token } if token == "abc"
        ));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let cases = [("vertex 1e39 0 0", 1, "1e39"), ("vertex 0 nan 0", 2, "nan"), ("vertex 0 0 inf", 3, "inf")];
        for (line, expected_field, expected_token) in cases {
            let text = ONE_FACET.replacen("vertex 1 0 0", line, 1);
            let err = decode_str(&text, 1).unwrap_err();
            match err {
                LoadError::ConvertToFloat { line: 5, field, token } => {
                    assert_eq!(field, expected_field);
                    assert_eq!(token, expected_token);
                }
                other => panic!("{line:?} gave {other}"),
            }
        }
    }

    #[test]
    fn test_tabs_do_not_separate_tokens() {
        let text = ONE_FACET.replacen("vertex 0 0 0", "vertex\t1 2 3", 1);
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(err, LoadError::VectorHeaderMissing { line: 4, .. }));

        let text = ONE_FACET.replacen("vertex 0 0 0", "vertex 1\t2 3", 1);
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(err, LoadError::NumberUnterminated { line: 4, field: 2, .. }));
    }

    #[test]
    fn test_missing_fields_are_positional() {
        let cases = [
            ("vertex ", LoadError::NumberMissing { line: 4, header: VERTEX_HEADER, field: 1 }),
            ("vertex 1", LoadError::NumberUnterminated { line: 4, header: VERTEX_HEADER, field: 1 }),
            ("vertex 1 ", LoadError::NumberMissing { line: 4, header: VERTEX_HEADER, field: 2 }),
            ("vertex 1 2", LoadError::NumberUnterminated { line: 4, header: VERTEX_HEADER, field: 2 }),
            ("vertex 1 2   ", LoadError::NumberMissing { line: 4, header: VERTEX_HEADER, field: 3 }),
        ];
        for (line, expected) in cases {
            let text = ONE_FACET.replacen("vertex 0 0 0", line, 1);
            let err = decode_str(&text, 1).unwrap_err();
            assert_eq!(err.code(), expected.code(), "line {:?} gave {}", line, err);
            assert_eq!(err.line(), Some(4));
        }
    }

    #[test]
    fn test_header_missing() {
        let text = ONE_FACET.replacen("vertex 0 1 0", "vertx 0 1 0", 1);
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(err, LoadError::VectorHeaderMissing { line: 6, .. }));
    }

    #[test]
    fn test_structural_keyword_mismatch() {
        let text = ONE_FACET.replacen("outer loop", "inner loop", 1);
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnexpectedKeyword { line: 3, expected: "outer loop" }
        ));
    }

    #[test]
    fn test_first_and_last_line() {
        let err = decode_str(&ONE_FACET.replacen("solid X", "solidX", 1), 1).unwrap_err();
        assert!(matches!(err, LoadError::SolidExpected));

        let err = decode_str(&ONE_FACET.replacen("endsolid X", "end", 1), 1).unwrap_err();
        assert!(matches!(err, LoadError::EndsolidExpected { line: 9 }));

        let err = decode_str(&ONE_FACET.replacen("endsolid X\n", "", 1), 1).unwrap_err();
        assert!(matches!(err, LoadError::EndsolidUnreadable { line: 9 }));

        let err = decode_str("", 1).unwrap_err();
        assert!(matches!(err, LoadError::SolidUnreadable));
    }

    #[test]
    fn test_truncated_inside_facet() {
        let text: String = ONE_FACET.lines().take(5).map(|l| format!("{}\n", l)).collect();
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(err, LoadError::VectorLineUnreadable { line: 6, .. }));

        let text: String = ONE_FACET.lines().take(6).map(|l| format!("{}\n", l)).collect();
        let err = decode_str(&text, 1).unwrap_err();
        assert!(matches!(err, LoadError::FacetLineUnreadable { line: 7 }));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case(b"  EndSolid part", b"endsolid"));
        assert!(!contains_ignore_case(b"end solid", b"endsolid"));
        assert!(!contains_ignore_case(b"", b"endsolid"));
    }
}
