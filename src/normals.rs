/// Per-vertex normals estimated from the axis-aligned neighbour ring.
use crate::heightfield::HeightField;
use glam::Vec3;

/// The in-bounds axis neighbours of a grid vertex, in west, north, east,
/// south order.  Corners hold 2, edges 3, interior vertices 4.
#[derive(Clone, Copy, Debug)]
pub struct NeighborRing {
    points: [Vec3; 4],
    len: usize,
}

impl NeighborRing {
    pub fn collect(field: &HeightField, x: usize, z: usize) -> Self {
        let mut ring = Self {
            points: [Vec3::ZERO; 4],
            len: 0,
        };
        if x > 0 {
            ring.push(field.place_vertex(x - 1, z));
        }
        if z > 0 {
            ring.push(field.place_vertex(x, z - 1));
        }
        if x + 1 < field.width() {
            ring.push(field.place_vertex(x + 1, z));
        }
        if z + 1 < field.depth() {
            ring.push(field.place_vertex(x, z + 1));
        }
        ring
    }

    fn push(&mut self, p: Vec3) {
        self.points[self.len] = p;
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.points[..self.len]
    }

    /// Consecutive neighbour pairs around the ring, wrapping at the end.
    ///
    /// A two-neighbour ring has a single edge: wrapping would revisit the
    /// same pair reversed and cancel its cross product.
    fn pairs(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        let pts = self.as_slice();
        let count = match pts.len() {
            0 | 1 => 0,
            2 => 1,
            n => n,
        };
        (0..count).map(move |i| (pts[i], pts[(i + 1) % pts.len()]))
    }
}

/// Smooth unit normal for grid vertex `(x, z)`.
///
/// Sums the cross products of consecutive centre-to-neighbour vectors,
/// averages by neighbour count and normalises.  A zero-length sum gives
/// `Vec3::ZERO`.  The vertical component is mirrored to be non-negative.
///
/// Corner vertices contribute their single neighbour pair once instead of
/// wrapping back onto it, so they get a real normal rather than zero.
pub fn estimate_normal(field: &HeightField, x: usize, z: usize) -> Vec3 {
    let v = field.place_vertex(x, z);
    let ring = NeighborRing::collect(field, x, z);
    if ring.is_empty() {
        return Vec3::ZERO;
    }

    let sum = ring
        .pairs()
        .fold(Vec3::ZERO, |acc, (n1, n2)| acc + (n1 - v).cross(n2 - v));
    let avg = sum / ring.len() as f32;

    let length = avg.length();
    let mut normal = if length > 0.0 { avg / length } else { Vec3::ZERO };
    normal.y = normal.y.abs();
    normal
}
