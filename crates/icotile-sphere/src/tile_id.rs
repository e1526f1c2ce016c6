//! Triangular tile addresses on the icosphere.
//!
//! At depth `d` every face is cut into a `2^d x 2^d` grid of squares over
//! its `(U, V)` frame. Squares below the `U + V = 1` diagonal hold upright
//! triangles; the square halves above it are folded back onto the face by
//! the reflection `(U, V) -> (1 - U, 1 - V)` and become the inverted
//! triangles. Every `(x, y)` in the grid is therefore a distinct tile, which
//! yields `4^d` tiles per face.

use glam::DVec3;

use crate::lattice::LatticePoint;
use crate::{Barycentric, direction_from_barycentric};

/// Deepest supported subdivision level.
pub const MAX_DEPTH: u8 = 16;

/// Tiles along one face edge at `depth`.
///
/// # Panics
///
/// Panics if `depth` exceeds [`MAX_DEPTH`].
#[inline]
#[must_use]
pub fn tiles_per_edge(depth: u8) -> u32 {
    assert!(depth <= MAX_DEPTH, "depth {depth} exceeds MAX_DEPTH {MAX_DEPTH}");
    1 << depth
}

/// Whether `(x, y)` addresses a tile at `depth`.
///
/// Every square of the grid is valid: the lower ones are upright tiles and
/// the upper ones reflect to inverted tiles.
#[must_use]
pub fn is_valid_tile_index(x: u32, y: u32, depth: u8) -> bool {
    if depth > MAX_DEPTH {
        return false;
    }
    let n = 1u32 << depth;
    x < n && y < n
}

/// Un-reflected barycentric origin `(x / n, y / n)` of a grid square.
#[must_use]
pub fn tile_origin(depth: u8, x: u32, y: u32) -> Barycentric {
    let n = f64::from(tiles_per_edge(depth));
    Barycentric::new(f64::from(x) / n, f64::from(y) / n)
}

/// World-space corners of a tile on a sphere of `radius` around `center`.
#[must_use]
pub fn get_corners(tile: &TileId, radius: f64, center: DVec3) -> [DVec3; 3] {
    tile.corner_directions().map(|d| center + d * radius)
}

/// Identifies one triangular tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    /// Icosahedron face, `0..20`.
    pub face: u8,
    /// Subdivision depth, `0..=MAX_DEPTH`.
    pub depth: u8,
    /// Grid column along `U`.
    pub x: u32,
    /// Grid row along `V`.
    pub y: u32,
}

impl TileId {
    /// Construct a tile address.
    ///
    /// # Panics
    ///
    /// Panics if `face >= 20`, `depth > MAX_DEPTH`, or `x`/`y` fall outside
    /// the grid at `depth`.
    #[must_use]
    pub fn new(face: u8, depth: u8, x: u32, y: u32) -> Self {
        assert!(
            (face as usize) < crate::FACE_COUNT,
            "face {face} out of range"
        );
        let n = tiles_per_edge(depth);
        assert!(x < n, "x={x} out of range for depth {depth} (max {n})");
        assert!(y < n, "y={y} out of range for depth {depth} (max {n})");
        Self { face, depth, x, y }
    }

    /// Like [`TileId::new`] but returns `None` on invalid input.
    #[must_use]
    pub fn try_new(face: u8, depth: u8, x: u32, y: u32) -> Option<Self> {
        ((face as usize) < crate::FACE_COUNT && is_valid_tile_index(x, y, depth))
            .then_some(Self { face, depth, x, y })
    }

    /// The single tile covering a whole face.
    #[must_use]
    pub fn face_root(face: u8) -> Self {
        Self::new(face, 0, 0, 0)
    }

    /// Whether this tile comes from the upper half of the grid and is
    /// mirrored onto the face.
    #[inline]
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.x + self.y >= tiles_per_edge(self.depth)
    }

    /// Corner points on the face's vertex grid at this depth, in the order
    /// the tile lattice visits them: local `(0,0)`, `(res-1,0)`, `(0,res-1)`.
    #[must_use]
    pub fn corner_grid_points(&self) -> [(u32, u32); 3] {
        let (x, y) = (self.x, self.y);
        if self.is_inverted() {
            let n = tiles_per_edge(self.depth);
            [(n - x, n - y), (n - x - 1, n - y), (n - x, n - y - 1)]
        } else {
            [(x, y), (x + 1, y), (x, y + 1)]
        }
    }

    /// Corners as face-lattice points with `tiles_per_edge` segments.
    #[must_use]
    pub fn corner_lattice_points(&self) -> [LatticePoint; 3] {
        let n = u64::from(tiles_per_edge(self.depth));
        self.corner_grid_points()
            .map(|(a, b)| LatticePoint::new(self.face, u64::from(a), u64::from(b), n))
    }

    /// Corners as face barycentrics.
    #[must_use]
    pub fn corner_barycentrics(&self) -> [Barycentric; 3] {
        self.corner_lattice_points().map(|p| p.barycentric())
    }

    /// Unit directions of the corners.
    #[must_use]
    pub fn corner_directions(&self) -> [DVec3; 3] {
        self.corner_lattice_points().map(|p| p.direction())
    }

    /// Barycentric centroid of the tile.
    #[must_use]
    pub fn centroid(&self) -> Barycentric {
        Barycentric::centroid(self.corner_barycentrics())
    }

    /// Unit direction through the tile's centroid.
    #[must_use]
    pub fn center_direction(&self) -> DVec3 {
        direction_from_barycentric(self.face, self.centroid())
    }

    /// The tile at `depth` on `face` that contains `bary`.
    ///
    /// Coordinates slightly outside the face triangle are clamped onto the
    /// nearest tile. Points on a boundary shared by several tiles resolve
    /// deterministically.
    #[must_use]
    pub fn containing(face: u8, depth: u8, bary: Barycentric) -> TileId {
        let n = tiles_per_edge(depth);
        let last = n - 1;
        let fu = bary.u.max(0.0) * f64::from(n);
        let fv = bary.v.max(0.0) * f64::from(n);
        // `as` saturates, so NaN and huge values still land in the grid.
        let mut x = (fu.floor() as u32).min(last);
        let mut y = (fv.floor() as u32).min(last);

        if x + y > last {
            let excess = x + y - last;
            let dx = excess.min(x);
            x -= dx;
            y -= excess - dx;
            return TileId::new(face, depth, x, y);
        }
        if x + y == last {
            return TileId::new(face, depth, x, y);
        }
        let frac = (fu - f64::from(x)) + (fv - f64::from(y));
        if frac > 1.0 {
            TileId::new(face, depth, last - x, last - y)
        } else {
            TileId::new(face, depth, x, y)
        }
    }

    /// The tile one depth coarser that contains this one.
    ///
    /// Returns `None` at depth 0.
    #[must_use]
    pub fn parent(&self) -> Option<TileId> {
        if self.depth == 0 {
            return None;
        }
        Some(TileId::containing(self.face, self.depth - 1, self.centroid()))
    }

    /// The four tiles one depth finer that cover this one.
    ///
    /// Returns `None` at [`MAX_DEPTH`].
    #[must_use]
    pub fn children(&self) -> Option<[TileId; 4]> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        let child_depth = self.depth + 1;
        let [p0, p1, p2] = self.corner_grid_points().map(|(a, b)| (a * 2, b * 2));
        let mid = |p: (u32, u32), q: (u32, u32)| ((p.0 + q.0) / 2, (p.1 + q.1) / 2);
        let (m01, m02, m12) = (mid(p0, p1), mid(p0, p2), mid(p1, p2));

        Some([
            tile_from_grid_triangle(self.face, child_depth, [p0, m01, m02]),
            tile_from_grid_triangle(self.face, child_depth, [m01, p1, m12]),
            tile_from_grid_triangle(self.face, child_depth, [m02, m12, p2]),
            tile_from_grid_triangle(self.face, child_depth, [m01, m12, m02]),
        ])
    }

    /// Every tile at `depth`, face by face, row by row.
    pub fn all_at_depth(depth: u8) -> impl Iterator<Item = TileId> {
        let n = tiles_per_edge(depth);
        (0..crate::FACE_COUNT as u8).flat_map(move |face| {
            (0..n).flat_map(move |y| (0..n).map(move |x| TileId { face, depth, x, y }))
        })
    }
}

/// Find the tile whose corners are the three given grid points.
///
/// The points must form one cell of the union-jack grid at `depth`.
pub(crate) fn tile_from_grid_triangle(face: u8, depth: u8, points: [(u32, u32); 3]) -> TileId {
    let n = tiles_per_edge(depth);
    let a = points.iter().map(|p| p.0).min().unwrap_or(0);
    let b = points.iter().map(|p| p.1).min().unwrap_or(0);
    let upright = [(a, b), (a + 1, b), (a, b + 1)];
    if upright.iter().all(|c| points.contains(c)) {
        TileId::new(face, depth, a, b)
    } else {
        TileId::new(face, depth, n - 1 - a, n - 1 - b)
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(face={}, depth={}, x={}, y={})",
            self.face, self.depth, self.x, self.y
        )
    }
}
