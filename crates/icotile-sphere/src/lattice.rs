//! Triangular vertex lattices inside tiles and their face-global positions.
//!
//! A tile sampled at `resolution` holds the lattice points `(i, j)` with
//! `i + j <= resolution - 1`. On its face those points land on a global
//! integer grid with `tiles_per_edge * (resolution - 1)` segments per face
//! edge. Every orientation and boundary decision is taken on those integers,
//! so two tiles that share a point always agree on it exactly.

use glam::DVec3;

use crate::icosahedron::{FACES, FaceEdge, face_vertices};
use crate::{Barycentric, TileId, tiles_per_edge};

/// Number of lattice points in a tile at `resolution`.
#[inline]
#[must_use]
pub const fn lattice_vertex_count(resolution: u32) -> usize {
    let r = resolution as usize;
    r * (r + 1) / 2
}

/// Row-major index of `(i, j)` in a tile lattice at `resolution`.
///
/// Row `j` holds `resolution - j` points, so the row starts after
/// `j * resolution - j * (j - 1) / 2` earlier points.
#[inline]
#[must_use]
pub const fn lattice_index(i: u32, j: u32, resolution: u32) -> usize {
    let (i, j, r) = (i as usize, j as usize, resolution as usize);
    j * r - j * j.saturating_sub(1) / 2 + i
}

/// Iterator over the local lattice coordinates of a tile, row by row.
///
/// Yields `(i, j)` with `j` as the outer loop. Every call to
/// [`tile_vertex_barys`] starts a fresh, independent sequence.
#[derive(Clone, Debug)]
pub struct TileVertexBarys {
    resolution: u32,
    i: u32,
    j: u32,
}

/// Enumerate the local lattice of a tile at `resolution`.
#[must_use]
pub fn tile_vertex_barys(resolution: u32) -> TileVertexBarys {
    TileVertexBarys {
        resolution,
        i: 0,
        j: 0,
    }
}

impl Iterator for TileVertexBarys {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.j >= self.resolution {
            return None;
        }
        let item = (self.i, self.j);
        self.i += 1;
        if self.i + self.j >= self.resolution {
            self.i = 0;
            self.j += 1;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.j >= self.resolution {
            0
        } else {
            lattice_vertex_count(self.resolution) - lattice_index(self.i, self.j, self.resolution)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileVertexBarys {}

/// A vertex of the global lattice of one face.
///
/// `(a, b)` counts segments along the `U` and `V` axes; the point's
/// barycentric coordinate is `(a / segments, b / segments)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LatticePoint {
    /// Icosahedron face.
    pub face: u8,
    /// Steps along `U`.
    pub a: u64,
    /// Steps along `V`.
    pub b: u64,
    /// Steps per face edge.
    pub segments: u64,
}

impl LatticePoint {
    /// Construct a lattice point. `a + b` must not exceed `segments`.
    #[must_use]
    pub fn new(face: u8, a: u64, b: u64, segments: u64) -> Self {
        debug_assert!(
            a + b <= segments,
            "lattice point ({a}, {b}) lies outside a face with {segments} segments"
        );
        Self {
            face,
            a,
            b,
            segments,
        }
    }

    /// Integer weights `[W, U, V]` scaled by `segments`.
    #[inline]
    #[must_use]
    pub fn weights(&self) -> [u64; 3] {
        [self.segments - self.a - self.b, self.a, self.b]
    }

    /// The point as a face barycentric coordinate.
    #[must_use]
    pub fn barycentric(&self) -> Barycentric {
        let s = self.segments as f64;
        Barycentric::new(self.a as f64 / s, self.b as f64 / s)
    }

    /// Unit direction of this point.
    ///
    /// Uses the integer weights directly, so a point on an edge shared by
    /// two faces produces the same bits from either face.
    #[must_use]
    pub fn direction(&self) -> DVec3 {
        let [p0, p1, p2] = face_vertices(self.face);
        let [w0, w1, w2] = self.weights();
        if w0 == self.segments {
            return p0;
        }
        if w1 == self.segments {
            return p1;
        }
        if w2 == self.segments {
            return p2;
        }
        (p0 * w0 as f64 + p1 * w1 as f64 + p2 * w2 as f64).normalize()
    }

    /// Whether the point lies on the given edge of its face.
    #[must_use]
    pub fn is_on_edge(&self, edge: FaceEdge) -> bool {
        match edge {
            FaceEdge::Base => self.b == 0,
            FaceEdge::Side => self.a == 0,
            FaceEdge::Diagonal => self.a + self.b == self.segments,
        }
    }

    /// Whether the point lies on any edge of its face.
    #[must_use]
    pub fn is_on_face_boundary(&self) -> bool {
        FaceEdge::ALL.into_iter().any(|e| self.is_on_edge(e))
    }

    /// Express the same point in the frame of another face.
    ///
    /// Returns `None` unless every vertex carrying weight is a corner of
    /// `target`, i.e. the point lies on geometry the two faces share.
    #[must_use]
    pub fn transfer_to(&self, target: u8) -> Option<LatticePoint> {
        if target == self.face {
            return Some(*self);
        }
        let source = FACES[self.face as usize];
        let dest = FACES[target as usize];
        let weights = self.weights();

        let mut dest_weights = [0u64; 3];
        for (slot, &vertex) in source.iter().enumerate() {
            if weights[slot] == 0 {
                continue;
            }
            let dest_slot = dest.iter().position(|&v| v == vertex)?;
            dest_weights[dest_slot] = weights[slot];
        }
        Some(LatticePoint::new(
            target,
            dest_weights[1],
            dest_weights[2],
            self.segments,
        ))
    }
}

/// Map a local lattice coordinate of `tile` to the global lattice of its face.
///
/// The local point is scaled into the tile's square of the face grid. Tiles
/// whose square lies beyond the `U + V = 1` edge (inverted tiles) are
/// reflected through `(U, V) -> (1 - U, 1 - V)`, which lands them on the
/// inverted sub-triangle of the union-jack subdivision.
///
/// # Panics
///
/// Panics if `resolution < 2`.
#[must_use]
pub fn local_to_global_lattice(tile: &TileId, local: (u32, u32), resolution: u32) -> LatticePoint {
    assert!(resolution >= 2, "tile resolution must be at least 2, got {resolution}");
    let (i, j) = local;
    debug_assert!(
        i + j < resolution,
        "local ({i}, {j}) outside lattice of resolution {resolution}"
    );

    let step = u64::from(resolution - 1);
    let segments = u64::from(tiles_per_edge(tile.depth)) * step;
    let a = u64::from(tile.x) * step + u64::from(i);
    let b = u64::from(tile.y) * step + u64::from(j);

    if tile.is_inverted() {
        LatticePoint::new(tile.face, segments - a, segments - b, segments)
    } else {
        LatticePoint::new(tile.face, a, b, segments)
    }
}

/// Map a local lattice coordinate of `tile` to a face barycentric coordinate.
///
/// See [`local_to_global_lattice`].
///
/// # Panics
///
/// Panics if `resolution < 2`.
#[must_use]
pub fn local_to_global_bary(tile: &TileId, local: (u32, u32), resolution: u32) -> Barycentric {
    local_to_global_lattice(tile, local, resolution).barycentric()
}
