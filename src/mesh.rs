/// Triangle-strip assembly over the staggered grid.
use crate::color::{ColorMapper, Rgb};
use crate::heightfield::HeightField;
use crate::noise::NoiseSource;
use crate::normals::estimate_normal;

/// Direction a row is walked in.  Rows alternate so consecutive rows join
/// into one continuous strip.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Heading {
    Right,
    Left,
}

impl Heading {
    fn of_row(z: usize) -> Self {
        if z % 2 == 0 { Heading::Right } else { Heading::Left }
    }
}

/// One triangle strip: positions, normals and colours in lock-step.
///
/// Order is the draw order; consecutive triples form the strip's triangles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    colors: Vec<Rgb>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Borrowed flat arrays, three floats per vertex, ready for a strip draw.
    pub fn strip(&self) -> StripArrays<'_> {
        StripArrays {
            positions: self.positions.as_flattened(),
            normals: self.normals.as_flattened(),
            colors: self.colors.as_flattened(),
            count: self.positions.len(),
        }
    }
}

/// Flat vertex/normal/colour arrays plus vertex count, as handed to a renderer.
#[derive(Clone, Copy, Debug)]
pub struct StripArrays<'a> {
    pub positions: &'a [f32],
    pub normals: &'a [f32],
    pub colors: &'a [f32],
    pub count: usize,
}

/// Number of vertices [`build`] emits for a `width × depth` grid.
pub fn strip_len(width: usize, depth: usize) -> usize {
    if width == 0 || depth < 2 {
        return 0;
    }
    // Every cell emits two vertices except one wrap column per row after the first.
    2 * width * (depth - 1) - (depth - 2)
}

/// Walks the grid serpentine-fashion and emits a single triangle strip.
///
/// Each visited cell contributes the vertex on row `z` (unless it is a row
/// wrap column) followed by the vertex on row `z + 1`.  Skipping the wrap
/// column keeps the turn from producing a triangle that spans unrelated rows.
pub fn build(field: &HeightField, mapper: &ColorMapper, noise: &impl NoiseSource) -> Mesh {
    let width = field.width();
    let depth = field.depth();
    let min_height = field.min_height();
    let max_height = field.max_height();

    if max_height <= min_height {
        tracing::warn!(
            height = min_height,
            "height range is degenerate; every vertex takes the first palette colour"
        );
    }

    let capacity = strip_len(width, depth);
    let mut mesh = Mesh {
        positions: Vec::with_capacity(capacity),
        normals: Vec::with_capacity(capacity),
        colors: Vec::with_capacity(capacity),
    };

    for i in 0..(depth.saturating_sub(1) * width) {
        let z = i / width;
        let heading = Heading::of_row(z);
        let x = match heading {
            Heading::Right => i % width,
            Heading::Left => width - 1 - i % width,
        };

        let wraps = match heading {
            Heading::Right => x == 0 && z > 0,
            Heading::Left => x == width - 1,
        };
        let first_row = if wraps { z + 1 } else { z };

        for row in first_row..=z + 1 {
            let v = field.place_vertex(x, row);
            let n = estimate_normal(field, x, row);
            let c = mapper.color_for(v, min_height, max_height, noise);
            mesh.positions.push(v.to_array());
            mesh.normals.push(n.to_array());
            mesh.colors.push(c);
        }
    }

    tracing::info!(vertices = mesh.vertex_count(), "terrain strip built");
    mesh
}
