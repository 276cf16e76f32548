/// Wireframe geometry shared by the loader, the transforms and renderers
use nalgebra::{Point3, Vector3};
use thiserror::Error;

/// Errors raised when assembling a mesh from raw buffers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("vertex buffer length {0} is not a multiple of 3")]
    RaggedVertices(usize),

    #[error("index buffer length {0} is odd")]
    OddIndexCount(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Bounds {
    /// A box containing a single point
    pub fn from_point(point: Point3<f64>) -> Self {
        Self { min: point, max: point }
    }

    /// Grow the box to contain `point`
    pub fn include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Largest per-axis extent
    pub fn range(&self) -> f64 {
        self.extent().max()
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// A wireframe mesh: flat xyz positions and pairs of line-segment indices.
///
/// The buffers are private; renderers borrow them through [`Mesh::positions`]
/// and [`Mesh::indices`] and must not hold the slices across a transform or a
/// reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<f64>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh with room for `vertex_count` vertices and `index_count` indices
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from raw buffers, checking the index invariants
    pub fn from_buffers(vertices: Vec<f64>, indices: Vec<u32>) -> Result<Self, GeometryError> {
        if vertices.len() % 3 != 0 {
            return Err(GeometryError::RaggedVertices(vertices.len()));
        }
        if indices.len() % 2 != 0 {
            return Err(GeometryError::OddIndexCount(indices.len()));
        }
        let vertex_count = vertices.len() / 3;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeometryError::IndexOutOfRange { index, vertex_count });
        }
        Ok(Self { vertices, indices })
    }

    pub(crate) fn push_vertex(&mut self, x: f64, y: f64, z: f64) {
        self.vertices.extend_from_slice(&[x, y, z]);
    }

    /// Append one segment. Callers range-check against the final vertex count.
    pub(crate) fn push_segment(&mut self, a: u32, b: u32) {
        self.indices.extend_from_slice(&[a, b]);
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [f64] {
        &mut self.vertices
    }

    /// Flat xyz positions, 3 values per vertex
    pub fn positions(&self) -> &[f64] {
        &self.vertices
    }

    /// Segment endpoints, 2 values per edge
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn edge_count(&self) -> usize {
        self.indices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<Point3<f64>> {
        let start = index.checked_mul(3)?;
        let xyz = self.vertices.get(start..start.checked_add(3)?)?;
        Some(Point3::new(xyz[0], xyz[1], xyz[2]))
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
    }

    pub fn segments(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.indices.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Bounding box of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.vertices();
        let mut bounds = Bounds::from_point(points.next()?);
        for point in points {
            bounds.include(&point);
        }
        Some(bounds)
    }

    /// Unit wireframe cube spanning [0, 1] on every axis
    pub fn cube() -> Self {
        let vertices = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, //
            1.0, 0.0, 1.0, //
            1.0, 1.0, 1.0, //
            0.0, 1.0, 1.0,
        ];
        let indices = vec![
            0, 1, 1, 2, 2, 3, 3, 0, // Back face
            4, 5, 5, 6, 6, 7, 7, 4, // Front face
            0, 4, 1, 5, 2, 6, 3, 7, // Connecting edges
        ];
        Self { vertices, indices }
    }
}
