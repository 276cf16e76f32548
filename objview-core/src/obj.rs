/// Wavefront OBJ wireframe loader
///
/// Loading is two-pass: [`scan`] counts vertices and segment indices and
/// measures the bounding box, then the reader is rewound and the mesh is
/// filled into buffers sized from those counts. Only `v`, `l` and `f`
/// directives are understood; every other line is ignored.
use nalgebra::Point3;
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, i64 as signed, space0},
    combinator::{all_consuming, opt, rest},
    number::complete::double,
    sequence::{preceded, terminated},
    IResult,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::geometry::{Bounds, Mesh};

/// Errors produced while loading an OBJ file
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// How malformed directive lines are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Bad coordinates read as 0.0, bad `l`/`f` lines are skipped
    #[default]
    Lenient,
    /// Any malformed `v`, `l` or `f` line fails the load
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub mode: ParseMode,
    /// Map the bounding box into the unit cube anchored at its minimum corner
    pub normalize: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mode: ParseMode::Lenient,
            normalize: true,
        }
    }
}

impl LoadOptions {
    pub fn strict() -> Self {
        Self {
            mode: ParseMode::Strict,
            ..Self::default()
        }
    }
}

/// Counts and bounds gathered by the first pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjStats {
    pub vertex_count: usize,
    /// Two per `l` line, six per `f` line
    pub index_count: usize,
    pub bounds: Option<Bounds>,
}

impl ObjStats {
    /// Uniform normalization divisor. Degenerate boxes divide by 1.
    pub fn range(&self) -> f64 {
        self.bounds
            .map(|b| b.range())
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(1.0)
    }
}

enum Directive<'a> {
    Vertex(&'a str),
    Line(&'a str),
    Face(&'a str),
    Other,
}

fn keyword(input: &str) -> IResult<&str, &str> {
    preceded(space0, take_till1(|c: char| c.is_whitespace()))(input)
}

fn classify(line: &str) -> Directive<'_> {
    match keyword(line) {
        Ok((fields, "v")) => Directive::Vertex(fields),
        Ok((fields, "l")) => Directive::Line(fields),
        Ok((fields, "f")) => Directive::Face(fields),
        _ => Directive::Other,
    }
}

/// First component of a `v`, `v/vt` or `v/vt/vn` reference
fn vertex_ref(input: &str) -> IResult<&str, i64> {
    all_consuming(terminated(signed, opt(preceded(char('/'), rest))))(input)
}

fn parse_coords(fields: &str, mode: ParseMode) -> Result<[f64; 3], String> {
    let tokens: Vec<&str> = fields.split_whitespace().collect();
    let mut coords = [0.0; 3];

    match mode {
        ParseMode::Lenient => {
            for (coord, token) in coords.iter_mut().zip(&tokens) {
                *coord = double::<_, ()>(*token)
                    .map(|(_, v)| v)
                    .ok()
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0);
            }
        }
        ParseMode::Strict => {
            // An optional fourth (w) component is allowed and ignored
            if !(3..=4).contains(&tokens.len()) {
                return Err(format!("expected 3 coordinates, found {}", tokens.len()));
            }
            for (coord, token) in coords.iter_mut().zip(&tokens) {
                *coord = all_consuming(double::<_, ()>)(*token)
                    .map(|(_, v)| v)
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("invalid coordinate '{}'", token))?;
            }
        }
    }

    Ok(coords)
}

/// Resolve a 1-based (or negative, relative) reference to a 0-based index.
/// `seen` is the number of vertices parsed so far, `total` the file's count.
fn resolve(raw: i64, seen: usize, total: usize) -> Option<u32> {
    let index = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => seen as i64 + r,
    };
    if index < 0 || index as usize >= total {
        return None;
    }
    u32::try_from(index).ok()
}

fn parse_refs<'a>(
    tokens: impl Iterator<Item = &'a str>,
    seen: usize,
    total: usize,
) -> Result<Vec<u32>, String> {
    tokens
        .map(|token| {
            let (_, raw) =
                vertex_ref(token).map_err(|_| format!("invalid vertex reference '{}'", token))?;
            resolve(raw, seen, total)
                .ok_or_else(|| format!("vertex reference {} out of range", raw))
        })
        .collect()
}

/// Lenient mode logs and skips the line, strict mode fails the load
fn reject(mode: ParseMode, line: usize, reason: String) -> Result<(), LoadError> {
    match mode {
        ParseMode::Lenient => {
            log::warn!("skipping line {}: {}", line, reason);
            Ok(())
        }
        ParseMode::Strict => Err(LoadError::Parse { line, reason }),
    }
}

/// First pass: count directives and measure the bounding box
pub fn scan<R: BufRead>(reader: R, mode: ParseMode) -> Result<ObjStats, LoadError> {
    let mut stats = ObjStats {
        vertex_count: 0,
        index_count: 0,
        bounds: None,
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        match classify(&line) {
            Directive::Vertex(fields) => {
                let [x, y, z] = parse_coords(fields, mode)
                    .map_err(|reason| LoadError::Parse { line: number + 1, reason })?;
                let point = Point3::new(x, y, z);
                match stats.bounds.as_mut() {
                    Some(bounds) => bounds.include(&point),
                    None => stats.bounds = Some(Bounds::from_point(point)),
                }
                stats.vertex_count += 1;
            }
            Directive::Line(_) => stats.index_count += 2,
            Directive::Face(_) => stats.index_count += 6,
            Directive::Other => {}
        }
    }

    Ok(stats)
}

fn fill<R: BufRead>(
    reader: R,
    stats: &ObjStats,
    options: &LoadOptions,
) -> Result<Mesh, LoadError> {
    let mut mesh = Mesh::with_capacity(stats.vertex_count, stats.index_count);
    let (origin, range) = match (options.normalize, stats.bounds) {
        (true, Some(bounds)) => (bounds.min, stats.range()),
        _ => (Point3::origin(), 1.0),
    };

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        let seen = mesh.vertex_count();

        match classify(&line) {
            Directive::Vertex(fields) => {
                // Already validated by the first pass
                let [x, y, z] = parse_coords(fields, options.mode)
                    .map_err(|reason| LoadError::Parse { line: number, reason })?;
                mesh.push_vertex(
                    (x - origin.x) / range,
                    (y - origin.y) / range,
                    (z - origin.z) / range,
                );
            }
            Directive::Line(fields) => {
                // Lenient mode reads only the first two references, like `l %d %d`
                let limit = match options.mode {
                    ParseMode::Lenient => 2,
                    ParseMode::Strict => usize::MAX,
                };
                let tokens = fields.split_whitespace().take(limit);
                match parse_refs(tokens, seen, stats.vertex_count) {
                    Ok(refs) if refs.len() == 2 => mesh.push_segment(refs[0], refs[1]),
                    Ok(refs) => reject(
                        options.mode,
                        number,
                        format!("line has {} vertices, expected 2", refs.len()),
                    )?,
                    Err(reason) => reject(options.mode, number, reason)?,
                }
            }
            Directive::Face(fields) => match parse_refs(
                fields.split_whitespace(),
                seen,
                stats.vertex_count,
            ) {
                Ok(refs) if refs.len() == 3 => {
                    mesh.push_segment(refs[0], refs[1]);
                    mesh.push_segment(refs[1], refs[2]);
                    mesh.push_segment(refs[2], refs[0]);
                }
                Ok(refs) => reject(
                    options.mode,
                    number,
                    format!("face has {} vertices, expected 3", refs.len()),
                )?,
                Err(reason) => reject(options.mode, number, reason)?,
            },
            Directive::Other => {}
        }
    }

    Ok(mesh)
}

/// Load a mesh from any rewindable reader
pub fn read<R: BufRead + Seek>(mut reader: R, options: &LoadOptions) -> Result<Mesh, LoadError> {
    let stats = scan(&mut reader, options.mode)?;
    log::debug!(
        "scanned {} vertices, {} indices, bounds {:?}",
        stats.vertex_count,
        stats.index_count,
        stats.bounds
    );

    reader.rewind()?;
    fill(reader, &stats, options)
}

/// Parse OBJ text held in memory
pub fn parse_str(text: &str, options: &LoadOptions) -> Result<Mesh, LoadError> {
    read(Cursor::new(text.as_bytes()), options)
}

/// Load and normalize an OBJ file leniently
pub fn load(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    load_with(path, &LoadOptions::default())
}

pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = read(BufReader::new(file), options)?;
    log::info!(
        "loaded {}: {} vertices, {} edges",
        path.display(),
        mesh.vertex_count(),
        mesh.edge_count()
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(text: &str) -> Mesh {
        parse_str(text, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_triangle_fixture() {
        let mesh = lenient("v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n");
        assert_eq!(mesh.positions(), &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(mesh.indices(), &[0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn test_face_attributes_ignored() {
        let plain = lenient("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let attributed = lenient("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/10/20 2/11/21 3/12/22\n");
        assert_eq!(plain.indices(), attributed.indices());

        let no_texture = lenient("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//4 2//5 3//6\n");
        assert_eq!(plain.indices(), no_texture.indices());
    }

    #[test]
    fn test_explicit_line() {
        let mesh = lenient("v 0 0 0\nv 2 0 0\nl 2 1\n");
        assert_eq!(mesh.indices(), &[1, 0]);
    }

    #[test]
    fn test_vertices_only() {
        let mesh = lenient("# comment\nv 1 2 3\n\nv 4 5 6\nvn 0 0 1\nvt 0.5 0.5\n");
        assert_eq!(mesh.vertex_count(), 2);
        assert!(mesh.indices().is_empty());
    }

    #[test]
    fn test_leading_whitespace_and_crlf() {
        let mesh = lenient("  v 0 0 0\r\n\tv 1 0 0\r\n l 1 2\r\n");
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.indices(), &[0, 1]);
    }

    #[test]
    fn test_negative_references() {
        let mesh = lenient("v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\n");
        assert_eq!(mesh.indices(), &[0, 1, 1, 2, 2, 0]);
    }

    #[test]
    fn test_normalization_uses_uniform_range() {
        let mesh = lenient("v -2 0 10\nv 2 1 11\n");
        // x spans 4, the largest extent
        assert_eq!(mesh.positions(), &[0.0, 0.0, 0.0, 1.0, 0.25, 0.25]);
    }

    #[test]
    fn test_degenerate_range() {
        let mesh = lenient("v 5 5 5\n");
        assert_eq!(mesh.positions(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_lenient_bad_coordinate_reads_zero() {
        let options = LoadOptions {
            normalize: false,
            ..LoadOptions::default()
        };
        let mesh = parse_str("v 1 abc 2\nv 3\n", &options).unwrap();
        assert_eq!(mesh.positions(), &[1.0, 0.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_lenient_non_finite_coordinate_reads_zero() {
        let raw = LoadOptions {
            normalize: false,
            ..LoadOptions::default()
        };
        let mesh = parse_str("v nan 1 2\nv 1e400 -inf 3\n", &raw).unwrap();
        assert_eq!(mesh.positions(), &[0.0, 1.0, 2.0, 0.0, 0.0, 3.0]);

        let mesh = lenient("v nan 0 0\nv 1e400 1 1\nv inf -inf 2\nl 1 3\n");
        assert!(mesh.positions().iter().all(|&c| (0.0..=1.0).contains(&c)));
        assert_eq!(mesh.vertex(2).unwrap().z, 1.0);
    }

    #[test]
    fn test_lenient_line_reads_first_two_references() {
        let mesh = lenient("v 0 0 0\nv 1 0 0\nv 0 1 0\nl 1 2 x\nl 2 3 1\n");
        assert_eq!(mesh.indices(), &[0, 1, 1, 2]);
    }

    #[test]
    fn test_lenient_skips_bad_segments() {
        let mesh = lenient("v 0 0 0\nv 1 0 0\nv 0 1 0\nl 1 9\nl 0 1\nf 1 2 x\nf 1 2 3 1\nl 1 3\n");
        assert_eq!(mesh.indices(), &[0, 2]);
    }

    #[test]
    fn test_strict_rejects_malformed_lines() {
        let strict = LoadOptions::strict();
        let cases = [
            ("v 1 abc 2\n", 1),
            ("v 0 0 0\nv 1 1 1\nl 1 9\n", 3),
            ("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3 4\n", 5),
            ("v 0 0 0\nl 1\n", 2),
            ("v 0 0 0\nv 1 0 0\nl 1 2 x\n", 3),
            ("v nan 0 0\n", 1),
            ("v 0 inf 0\n", 1),
            ("v 0 0 1e400\n", 1),
        ];
        for (text, expected_line) in cases {
            match parse_str(text, &strict) {
                Err(LoadError::Parse { line, .. }) => assert_eq!(line, expected_line, "{text:?}"),
                other => panic!("expected parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_scan_counts() {
        let text = "v 0 0 0\nv 1 2 3\nl 1 2\nf 1 2 1\n# f 1 2 3\n";
        let stats = scan(Cursor::new(text), ParseMode::Lenient).unwrap();
        assert_eq!(stats.vertex_count, 2);
        assert_eq!(stats.index_count, 8);
        assert!((stats.range() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_file() {
        let result = load("/nonexistent/objview/model.obj");
        assert!(matches!(result, Err(LoadError::Open { .. })));
    }
}
