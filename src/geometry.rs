// src/geometry.rs

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use thiserror::Error;

use crate::attributes::VertexKind;
use crate::color::Color;

// Standard two-triangle split of a quad's own 4 vertices.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("polygon template needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("template vertex {0} is not finite")]
    NonFiniteVertex(usize),
    #[error("zero-length edge between template vertices {0} and {1}")]
    DegenerateEdge(usize, usize),
    #[error("instance range [{start}, {start}+{count}) exceeds stream length {len}")]
    RangeOutOfBounds { start: u32, count: u32, len: usize },
}

/// Ordered vertex ring in local unit space, implicitly closed.
///
/// Construction rejects rings that would poison the builder (fewer than 3
/// vertices, non-finite coordinates, zero-length edges whose outline
/// direction would be meaningless). Convexity and consistent winding are
/// still unchecked preconditions of the fan triangulation: a concave or
/// inconsistently wound ring builds fine and draws wrong.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonTemplate {
    vertices: Vec<Vec2>,
}

impl PolygonTemplate {
    pub fn new(vertices: Vec<Vec2>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        for (i, v) in vertices.iter().enumerate() {
            if !v.is_finite() {
                return Err(GeometryError::NonFiniteVertex(i));
            }
        }
        for i in 0..vertices.len() {
            let j = (i + 1) % vertices.len();
            if vertices[i] == vertices[j] {
                return Err(GeometryError::DegenerateEdge(i, j));
            }
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Per-instance placement. Only `rotation` is meant to change after the
/// instance is built, and it changes through the rotation stream, not here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub offset: Vec2,
    pub rotation: f32,
    pub size: f32,
}

/// Half-open range `[start, start+count)` of vertex records belonging to one
/// polygon instance, in logical record units shared by all streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceRange {
    pub start: u32,
    pub count: u32,
}

/// Parallel attribute streams plus the shared index buffer.
///
/// Index `i` denotes the same logical vertex in every stream; all streams
/// have identical length at all times. The streams are the upload staging
/// area, so coordinates stay in local template space and the placement is
/// carried per record — the shader applies rotate/scale/translate, which is
/// what lets a later in-place rotation write re-animate finished geometry.
#[derive(Debug, Default)]
pub struct VertexStreams {
    pub coords: Vec<[f32; 2]>,
    pub rotations: Vec<f32>,
    pub sizes: Vec<f32>,
    pub offsets: Vec<[f32; 2]>,
    pub outline_directions: Vec<f32>,
    pub attrs: Vec<u8>,
    pub colors: Vec<Color>,
    pub indices: Vec<u32>,
}

impl VertexStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertex records.
    pub fn len(&self) -> usize {
        debug_assert!(self.streams_aligned());
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn clear(&mut self) {
        self.coords.clear();
        self.rotations.clear();
        self.sizes.clear();
        self.offsets.clear();
        self.outline_directions.clear();
        self.attrs.clear();
        self.colors.clear();
        self.indices.clear();
    }

    /// All parallel streams agree on length.
    pub fn streams_aligned(&self) -> bool {
        let n = self.coords.len();
        self.rotations.len() == n
            && self.sizes.len() == n
            && self.offsets.len() == n
            && self.outline_directions.len() == n
            && self.attrs.len() == n
            && self.colors.len() == n
    }

    fn push_record(
        &mut self,
        coord: Vec2,
        placement: &Placement,
        outline_direction: f32,
        kind: VertexKind,
        color: Color,
    ) {
        self.coords.push(coord.to_array());
        self.rotations.push(placement.rotation);
        self.sizes.push(placement.size);
        self.offsets.push(placement.offset.to_array());
        self.outline_directions.push(outline_direction);
        self.attrs.push(kind.encode());
        self.colors.push(color);
    }

    fn push_indices(&mut self, pattern: &[u32], base: u32) {
        for &i in pattern {
            self.indices.push(base + i);
        }
    }

    /// Bounds-checked mutable view of one instance's rotation records.
    pub fn instance_rotations_mut(
        &mut self,
        range: InstanceRange,
    ) -> Result<&mut [f32], GeometryError> {
        let start = range.start as usize;
        let end = start + range.count as usize;
        if end > self.rotations.len() {
            return Err(GeometryError::RangeOutOfBounds {
                start: range.start,
                count: range.count,
                len: self.rotations.len(),
            });
        }
        Ok(&mut self.rotations[start..end])
    }
}

/// Appends one polygon instance to the streams: the filled body, one corner
/// quad per template vertex, one outline quad per edge.
///
/// For an N-vertex template this grows every stream by exactly `9N` records
/// and the index buffer by `15N - 6` indices, and returns the appended
/// range. Each sub-step takes its index base from the stream length at the
/// moment the sub-step begins.
pub fn build_polygon(
    streams: &mut VertexStreams,
    template: &PolygonTemplate,
    placement: &Placement,
    fill_color: Color,
    outline_color: Color,
) -> InstanceRange {
    let vertices = template.vertices();
    let n = vertices.len();
    let start = streams.len() as u32;

    // 1. Body fan. Requires a convex, consistently wound ring.
    for i in 0..n as u32 - 2 {
        streams.push_indices(&[0, i + 1, i + 2], start);
    }

    // 2. Body records, one per template vertex. Coordinates stay untransformed.
    let mut edge_directions = Vec::with_capacity(n);
    for i in 0..n {
        let v = vertices[i];
        let nv = vertices[(i + 1) % n];
        edge_directions.push((nv.y - v.y).atan2(nv.x - v.x) + FRAC_PI_2);
        streams.push_record(v, placement, 0.0, VertexKind::Body, fill_color);
    }

    // 3. Corner quads: four coincident copies of each vertex, told apart by
    // the selector bits. The shader spreads them into a cap.
    for &v in vertices {
        let base = streams.len() as u32;
        streams.push_indices(&QUAD_INDICES, base);
        for j in 0..4 {
            streams.push_record(v, placement, 0.0, VertexKind::Corner(j), outline_color);
        }
    }

    // 4. Edge quads: the quad is degenerate on the CPU (two copies of each
    // endpoint); the stored direction pushes the first pair to one side of
    // the edge and the second pair to the other at draw time.
    for i in 0..n {
        let v = vertices[i];
        let nv = vertices[(i + 1) % n];
        let direction = edge_directions[i];
        let base = streams.len() as u32;
        streams.push_indices(&QUAD_INDICES, base);
        for (coord, dir) in [
            (v, direction + PI),
            (nv, direction + PI),
            (nv, direction),
            (v, direction),
        ] {
            streams.push_record(coord, placement, dir, VertexKind::EdgeQuad, outline_color);
        }
    }

    InstanceRange {
        start,
        count: streams.len() as u32 - start,
    }
}

/// Append-only table of per-instance stream ranges. Owns no vertex data,
/// only offsets; read every frame to drive in-place rotation updates.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    ranges: Vec<InstanceRange>,
}

impl InstanceRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ranges: Vec::with_capacity(capacity),
        }
    }

    pub fn register(&mut self, range: InstanceRange) {
        self.ranges.push(range);
    }

    pub fn get_range(&self, instance: usize) -> Option<InstanceRange> {
        self.ranges.get(instance).copied()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = InstanceRange> + '_ {
        self.ranges.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{CORNER_SELECTORS, OUTLINE_CORNER};

    fn square() -> PolygonTemplate {
        PolygonTemplate::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ])
        .unwrap()
    }

    fn placement() -> Placement {
        Placement {
            offset: Vec2::new(10.0, -4.0),
            rotation: 0.3,
            size: 2.0,
        }
    }

    fn build_square(streams: &mut VertexStreams) -> InstanceRange {
        build_polygon(
            streams,
            &square(),
            &placement(),
            Color::new(0, 200, 0, 255),
            Color::new(72, 72, 72, 255),
        )
    }

    #[test]
    fn template_rejects_too_few_vertices() {
        let err = PolygonTemplate::new(vec![Vec2::ZERO, Vec2::ONE]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices(2));
    }

    #[test]
    fn template_rejects_zero_length_edge() {
        let err = PolygonTemplate::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, GeometryError::DegenerateEdge(1, 2));
    }

    #[test]
    fn template_rejects_closing_degenerate_edge() {
        // The implicit last->first edge is checked too.
        let err = PolygonTemplate::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err, GeometryError::DegenerateEdge(2, 0));
    }

    #[test]
    fn template_rejects_non_finite_vertex() {
        let err = PolygonTemplate::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(f32::NAN, 0.0),
            Vec2::new(0.0, 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, GeometryError::NonFiniteVertex(1));
    }

    #[test]
    fn build_grows_streams_by_nine_n() {
        let mut streams = VertexStreams::new();
        let range = build_square(&mut streams);
        let n = 4;
        assert_eq!(streams.len(), 9 * n);
        assert!(streams.streams_aligned());
        assert_eq!(streams.index_count(), 15 * n - 6);
        assert_eq!(
            range,
            InstanceRange {
                start: 0,
                count: 9 * n as u32
            }
        );

        // Second instance appends after the first.
        let range2 = build_square(&mut streams);
        assert_eq!(streams.len(), 18 * n);
        assert_eq!(streams.index_count(), 2 * (15 * n - 6));
        assert_eq!(
            range2,
            InstanceRange {
                start: 9 * n as u32,
                count: 9 * n as u32
            }
        );
    }

    #[test]
    fn indices_never_reference_forward() {
        let mut streams = VertexStreams::new();
        for _ in 0..3 {
            build_square(&mut streams);
        }
        let len = streams.len() as u32;
        assert!(streams.indices.iter().all(|&i| i < len));
    }

    #[test]
    fn square_body_fan_is_two_triangles() {
        let mut streams = VertexStreams::new();
        build_square(&mut streams);
        assert_eq!(&streams.indices[..6], &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn corner_quad_attrs_are_distinct_selectors() {
        let mut streams = VertexStreams::new();
        build_square(&mut streams);
        let n = 4;
        // Corner records sit right after the n body records.
        for corner in 0..n {
            let base = n + corner * 4;
            let attrs = &streams.attrs[base..base + 4];
            for j in 0..4 {
                assert_eq!(attrs[j], CORNER_SELECTORS[j] | OUTLINE_CORNER);
            }
            for j in 0..4 {
                for k in 0..4 {
                    if j != k {
                        assert_ne!(attrs[j], attrs[k]);
                    }
                }
            }
        }
    }

    #[test]
    fn horizontal_edge_direction_is_half_pi() {
        let template = PolygonTemplate::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.5, 1.0),
        ])
        .unwrap();
        let mut streams = VertexStreams::new();
        build_polygon(
            &mut streams,
            &template,
            &placement(),
            Color::BLACK,
            Color::BLACK,
        );
        // Edge 0 -> 1 runs along +x; its quad is the first one after the
        // 3 body records and 3 corner quads.
        let quad_base = 3 + 3 * 4;
        let dirs = &streams.outline_directions[quad_base..quad_base + 4];
        let d = FRAC_PI_2;
        assert!((dirs[0] - (d + PI)).abs() < 1e-6);
        assert!((dirs[1] - (d + PI)).abs() < 1e-6);
        assert!((dirs[2] - d).abs() < 1e-6);
        assert!((dirs[3] - d).abs() < 1e-6);
    }

    #[test]
    fn edge_quad_coords_are_endpoint_pairs() {
        let mut streams = VertexStreams::new();
        build_square(&mut streams);
        let verts = square();
        let n = verts.len();
        for i in 0..n {
            let quad_base = n + 4 * n + i * 4;
            let v = verts.vertices()[i].to_array();
            let nv = verts.vertices()[(i + 1) % n].to_array();
            assert_eq!(streams.coords[quad_base], v);
            assert_eq!(streams.coords[quad_base + 1], nv);
            assert_eq!(streams.coords[quad_base + 2], nv);
            assert_eq!(streams.coords[quad_base + 3], v);
        }
    }

    #[test]
    fn body_records_keep_template_coords() {
        let mut streams = VertexStreams::new();
        build_square(&mut streams);
        for (i, v) in square().vertices().iter().enumerate() {
            assert_eq!(streams.coords[i], v.to_array());
            assert_eq!(streams.rotations[i], placement().rotation);
            assert_eq!(streams.sizes[i], placement().size);
            assert_eq!(streams.offsets[i], placement().offset.to_array());
            assert_eq!(streams.outline_directions[i], 0.0);
            assert_eq!(streams.attrs[i], 0x00);
        }
    }

    #[test]
    fn registry_mutation_is_isolated_per_instance() {
        let mut streams = VertexStreams::new();
        let mut registry = InstanceRegistry::with_capacity(3);
        for _ in 0..3 {
            registry.register(build_square(&mut streams));
        }
        let before = streams.rotations.clone();

        let target = registry.get_range(1).unwrap();
        for r in streams.instance_rotations_mut(target).unwrap() {
            *r += 0.01;
        }

        let start = target.start as usize;
        let end = start + target.count as usize;
        for (i, (&now, &was)) in streams.rotations.iter().zip(&before).enumerate() {
            if i >= start && i < end {
                assert!((now - (was + 0.01)).abs() < 1e-6);
            } else {
                assert_eq!(now, was);
            }
        }
    }

    #[test]
    fn out_of_bounds_range_is_an_error() {
        let mut streams = VertexStreams::new();
        build_square(&mut streams);
        let bogus = InstanceRange {
            start: 30,
            count: 10,
        };
        assert!(matches!(
            streams.instance_rotations_mut(bogus),
            Err(GeometryError::RangeOutOfBounds { .. })
        ));
    }
}
