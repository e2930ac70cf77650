use thiserror::Error;

use crate::Vertex;

/// Two triangles covering clip space. `uv` runs top-left (0, 0) to
/// bottom-right (1, 1), so images uploaded row-major from the top appear
/// upright.
pub const SCREEN_VERTICES: [Vertex; 4] = [
    Vertex::new([-1.0, -1.0], [0.0, 1.0]),
    Vertex::new([1.0, -1.0], [1.0, 1.0]),
    Vertex::new([1.0, 1.0], [1.0, 0.0]),
    Vertex::new([-1.0, 1.0], [0.0, 0.0]),
];

pub const SCREEN_INDICES: [u32; 6] = [
    0, 1, 2, //
    2, 3, 0,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error("geometry has no complete triangle")]
    Empty,
}

/// Resolve an index list into vertex triples (triangle-list topology).
///
/// A trailing partial triple is ignored, matching what the GPU does with an
/// index count that is not a multiple of three.
pub fn triangles(vertices: &[Vertex], indices: &[u32]) -> Result<Vec<[Vertex; 3]>, GeometryError> {
    let lookup = |position: usize| {
        let index = indices[position];
        vertices
            .get(index as usize)
            .copied()
            .ok_or(GeometryError::IndexOutOfRange {
                position,
                index,
                vertex_count: vertices.len(),
            })
    };

    (0..indices.len() / 3)
        .map(|t| Ok([lookup(t * 3)?, lookup(t * 3 + 1)?, lookup(t * 3 + 2)?]))
        .collect()
}

/// Like [`triangles`], but also rejects geometry that would draw nothing.
pub fn validate(vertices: &[Vertex], indices: &[u32]) -> Result<usize, GeometryError> {
    let tris = triangles(vertices, indices)?;
    if tris.is_empty() {
        return Err(GeometryError::Empty);
    }
    Ok(tris.len())
}
