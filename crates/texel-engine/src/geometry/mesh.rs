use crate::error::{ResourceError, ResourceResult};
use crate::paint::Color;

use super::Vertex;

/// Index list of the unit quad: two triangles sharing the TR–BL diagonal.
///
/// ```text
/// [0]------[1]
///  |      / |
///  |    /   |
///  |  /     |
/// [2]------[3]
/// ```
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 3, 2, 1];

/// Validated triangle-list geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Builds a mesh, checking the index list against the vertex count.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> ResourceResult<Self> {
        if vertices.is_empty() {
            return Err(ResourceError::InvalidGeometry {
                message: "mesh has no vertices".to_string(),
            });
        }
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(ResourceError::InvalidGeometry {
                message: format!(
                    "index count {} is not a non-zero multiple of 3",
                    indices.len()
                ),
            });
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(ResourceError::InvalidGeometry {
                message: format!("index {bad} out of range for {} vertices", vertices.len()),
            });
        }
        Ok(Self { vertices, indices })
    }

    /// The 2x2 quad centred on the origin, UVs covering the whole texture,
    /// uniform white tint.
    pub fn quad() -> Self {
        let white = Color::WHITE;
        let vertices = vec![
            Vertex::new([-1.0, 1.0], [0.0, 1.0], white),  // top left
            Vertex::new([1.0, 1.0], [1.0, 1.0], white),   // top right
            Vertex::new([-1.0, -1.0], [0.0, 0.0], white), // bottom left
            Vertex::new([1.0, -1.0], [1.0, 0.0], white),  // bottom right
        ];
        Self {
            vertices,
            indices: QUAD_INDICES.to_vec(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Iterates triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(t: &[Vertex; 3]) -> f32 {
        let [a, b, c] = t.map(|v| v.position);
        0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
    }

    fn covers(t: &[Vertex; 3], p: [f32; 2]) -> bool {
        let [a, b, c] = t.map(|v| v.position);
        let edge = |u: [f32; 2], v: [f32; 2]| (v[0] - u[0]) * (p[1] - u[1]) - (v[1] - u[1]) * (p[0] - u[0]);
        let (d0, d1, d2) = (edge(a, b), edge(b, c), edge(c, a));
        let neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
        let pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
        !(neg && pos)
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn quad_passes_validation() {
        let q = Mesh::quad();
        let rebuilt = Mesh::new(q.vertices().to_vec(), q.indices().to_vec()).unwrap();
        assert_eq!(rebuilt, q);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let q = Mesh::quad();
        let err = Mesh::new(q.vertices().to_vec(), vec![0, 1, 4]).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidGeometry { .. }));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        let q = Mesh::quad();
        assert!(Mesh::new(q.vertices().to_vec(), vec![0, 1]).is_err());
        assert!(Mesh::new(q.vertices().to_vec(), vec![]).is_err());
        assert!(Mesh::new(vec![], vec![0, 0, 0]).is_err());
    }

    // ── quad layout ───────────────────────────────────────────────────────

    #[test]
    fn quad_uvs_match_corners() {
        for v in Mesh::quad().vertices() {
            let expected = [(v.position[0] + 1.0) / 2.0, (v.position[1] + 1.0) / 2.0];
            assert_eq!(v.uv, expected);
            assert_eq!(v.color, [1.0; 4]);
        }
    }

    #[test]
    fn quad_is_two_triangles_sharing_a_diagonal() {
        let q = Mesh::quad();
        assert_eq!(q.indices(), &[0, 1, 2, 3, 2, 1]);
        assert_eq!(q.triangles().count(), 2);

        let first: Vec<u32> = q.indices()[..3].to_vec();
        let shared: Vec<u32> = q.indices()[3..]
            .iter()
            .copied()
            .filter(|i| first.contains(i))
            .collect();
        assert_eq!(shared.len(), 2, "triangles must share exactly one edge");
    }

    #[test]
    fn triangles_tile_the_quad_without_overlap() {
        let tris: Vec<[Vertex; 3]> = Mesh::quad().triangles().collect();

        let total: f32 = tris.iter().map(|t| signed_area(t).abs()).sum();
        assert_eq!(total, 4.0);

        // Same winding for both halves.
        assert_eq!(signed_area(&tris[0]).signum(), signed_area(&tris[1]).signum());

        // Every sample strictly off the diagonal is covered exactly once.
        for iy in 0..16 {
            for ix in 0..16 {
                let p = [-0.97 + ix as f32 * 0.123, -0.95 + iy as f32 * 0.121];
                if (p[0] - p[1]).abs() < 1e-3 {
                    continue;
                }
                let hits = tris.iter().filter(|t| covers(t, p)).count();
                assert_eq!(hits, 1, "point {p:?} covered {hits} times");
            }
        }
    }
}
