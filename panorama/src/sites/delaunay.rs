//! Incremental Bowyer-Watson Delaunay triangulation.

use glam::DVec2;

use super::Triangulator;

/// Half-extent multiplier of the enclosing super triangle.
const SUPER_TRIANGLE_SCALE: f64 = 20.0;

/// Triangle of point indices with its cached circumcircle.
#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [usize; 3],
    center: DVec2,
    /// Squared circumradius, `INFINITY` for collinear vertices.
    radius_sq: f64,
}

impl Triangle {
    fn new(vertices: [usize; 3], points: &[DVec2]) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < f64::EPSILON {
            return Self {
                vertices,
                center: (a + b + c) / 3.0,
                radius_sq: f64::INFINITY,
            };
        }
        let (a2, b2, c2) = (a.length_squared(), b.length_squared(), c.length_squared());
        let center = DVec2::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        );
        Self {
            vertices,
            center,
            radius_sq: center.distance_squared(a),
        }
    }

    #[inline]
    fn circumcircle_contains(&self, p: DVec2) -> bool {
        self.center.distance_squared(p) < self.radius_sq
    }

    #[inline]
    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [edge_key(a, b), edge_key(b, c), edge_key(c, a)]
    }
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Default [`Triangulator`]: Bowyer-Watson insertion inside a large super triangle.
///
/// Exact duplicate points are triangulated once; every copy becomes a neighbor
/// of the others and inherits the neighbors of the point it duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayTriangulator;

impl DelaunayTriangulator {
    /// Delaunay edges between distinct points, as sorted index pairs.
    fn edges(points: &[DVec2]) -> Vec<(usize, usize)> {
        let n = points.len();
        if n < 2 {
            return Vec::new();
        }
        if n == 2 {
            return vec![(0, 1)];
        }

        let (min, max) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let span = (max - min).max_element().max(1.0);
        let mid = (min + max) / 2.0;
        let s = SUPER_TRIANGLE_SCALE * span;

        let mut all = points.to_vec();
        all.push(DVec2::new(mid.x - s, mid.y - span));
        all.push(DVec2::new(mid.x, mid.y + s));
        all.push(DVec2::new(mid.x + s, mid.y - span));

        let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &all)];
        let mut boundary: Vec<(usize, usize)> = Vec::new();

        for (index, &p) in points.iter().enumerate() {
            boundary.clear();
            triangles.retain(|t| {
                if t.circumcircle_contains(p) {
                    boundary.extend(t.edges());
                    false
                } else {
                    true
                }
            });

            // Cavity boundary: edges owned by exactly one removed triangle.
            boundary.sort_unstable();
            let mut i = 0;
            while i < boundary.len() {
                let edge = boundary[i];
                let mut j = i + 1;
                while j < boundary.len() && boundary[j] == edge {
                    j += 1;
                }
                if j - i == 1 {
                    triangles.push(Triangle::new([edge.0, edge.1, index], &all));
                }
                i = j;
            }
        }

        let mut edges: Vec<(usize, usize)> = triangles
            .iter()
            .flat_map(|t| t.edges())
            .filter(|&(a, b)| a < n && b < n)
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}

impl Triangulator for DelaunayTriangulator {
    fn neighbors(&self, points: &[DVec2]) -> Vec<Vec<usize>> {
        let n = points.len();

        // Collapse exact duplicates onto their first occurrence.
        let mut unique_points: Vec<DVec2> = Vec::with_capacity(n);
        let mut unique_of = Vec::with_capacity(n);
        for &p in points {
            let slot = match unique_points.iter().position(|&q| q == p) {
                Some(slot) => slot,
                None => {
                    unique_points.push(p);
                    unique_points.len() - 1
                }
            };
            unique_of.push(slot);
        }

        let unique_count = unique_points.len();
        let mut adjacent = vec![false; unique_count * unique_count];
        for (a, b) in Self::edges(&unique_points) {
            adjacent[a * unique_count + b] = true;
            adjacent[b * unique_count + a] = true;
        }

        (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| {
                        j != i
                            && (unique_of[i] == unique_of[j]
                                || adjacent[unique_of[i] * unique_count + unique_of[j]])
                    })
                    .collect()
            })
            .collect()
    }
}
