//! Barycentric coordinates inside an icosahedron face.

/// A point in a face's canonical triangle with corners `(0,0)`, `(1,0)`, `(0,1)`.
///
/// The third coordinate is derived: `W = 1 - U - V`. Points produced by the
/// tile lattice always satisfy `W >= 0`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Barycentric {
    /// Weight of face corner 1.
    pub u: f64,
    /// Weight of face corner 2.
    pub v: f64,
}

impl Barycentric {
    /// Face corner 0.
    pub const ORIGIN: Barycentric = Barycentric::new(0.0, 0.0);

    /// Construct from `U` and `V`.
    #[must_use]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    /// Weight of face corner 0.
    #[inline]
    #[must_use]
    pub fn w(&self) -> f64 {
        1.0 - self.u - self.v
    }

    /// The weights `[W, U, V]` in face-corner slot order.
    #[inline]
    #[must_use]
    pub fn weights(&self) -> [f64; 3] {
        [self.w(), self.u, self.v]
    }

    /// Whether the point lies strictly beyond the `U + V = 1` edge.
    ///
    /// A sum of exactly `1.0` is on the edge, not outside it.
    #[inline]
    #[must_use]
    pub fn is_outside(&self) -> bool {
        self.u + self.v > 1.0
    }

    /// The point mirrored through the centre of the unit square: `(1-U, 1-V)`.
    #[inline]
    #[must_use]
    pub fn reflected(&self) -> Self {
        Self::new(1.0 - self.u, 1.0 - self.v)
    }

    /// Fold a point of the unit square back into the face triangle.
    ///
    /// Points with `U + V > 1` belong to an inverted sub-triangle and are
    /// reflected; points on or inside the edge are returned unchanged.
    #[must_use]
    pub fn reflect_if_outside(self) -> Self {
        if self.is_outside() {
            self.reflected()
        } else {
            self
        }
    }

    /// Whether any of `U`, `V`, `W` is within `epsilon` of zero.
    #[must_use]
    pub fn is_on_edge(&self, epsilon: f64) -> bool {
        self.weights().iter().any(|w| w.abs() <= epsilon)
    }

    /// Average of three points.
    #[must_use]
    pub fn centroid(points: [Barycentric; 3]) -> Self {
        Self::new(
            (points[0].u + points[1].u + points[2].u) / 3.0,
            (points[0].v + points[1].v + points[2].v) / 3.0,
        )
    }
}
