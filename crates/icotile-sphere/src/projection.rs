//! Face barycentric coordinates to sphere directions and back.

use glam::DVec3;

use crate::Barycentric;
use crate::icosahedron::{FACE_COUNT, face_vertices};

/// Map a barycentric coordinate on `face` to a unit direction.
///
/// The flat-face point `W*p0 + U*p1 + V*p2` is normalized onto the sphere.
/// The three face corners return the stored vertex directions exactly.
///
/// # Panics
///
/// Panics if `face >= FACE_COUNT`.
#[must_use]
pub fn direction_from_barycentric(face: u8, bary: Barycentric) -> DVec3 {
    let [p0, p1, p2] = face_vertices(face);
    if bary.v == 0.0 {
        if bary.u == 0.0 {
            return p0;
        }
        if bary.u == 1.0 {
            return p1;
        }
    } else if bary.v == 1.0 && bary.u == 0.0 {
        return p2;
    }
    (p0 * bary.w() + p1 * bary.u + p2 * bary.v).normalize()
}

/// Determine which face a direction falls on.
///
/// The face whose centroid is closest in angle wins, which for a regular
/// icosahedron is the face whose plane the ray crosses first. Ties along
/// shared edges go to the lowest face index, so a given direction always
/// resolves to the same face. Zero or NaN directions resolve to face 0.
#[must_use]
pub fn face_from_direction(direction: DVec3) -> u8 {
    let mut best_face = 0u8;
    let mut best_dot = f64::NEG_INFINITY;
    for face in 0..FACE_COUNT as u8 {
        let [p0, p1, p2] = face_vertices(face);
        // All face vertex sums share one length, so the raw sum ranks faces
        // the same as the normalized centroid.
        let d = direction.dot(p0 + p1 + p2);
        if d > best_dot {
            best_dot = d;
            best_face = face;
        }
    }
    best_face
}

/// Inverse of [`direction_from_barycentric`] on a known face.
///
/// Intersects the ray along `direction` with the plane of `face` and
/// expresses the hit point in the face's barycentric frame. Coordinates may
/// fall outside `[0, 1]` when the direction belongs to another face.
/// Returns `None` when the ray does not cross the face plane in front of
/// the origin.
#[must_use]
pub fn barycentric_from_direction(face: u8, direction: DVec3) -> Option<Barycentric> {
    let [p0, p1, p2] = face_vertices(face);
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let normal = e1.cross(e2);

    let denom = direction.dot(normal);
    if denom <= 1e-300 || !denom.is_finite() {
        return None;
    }
    let hit = direction * (p0.dot(normal) / denom);
    let r = hit - p0;

    let d11 = e1.dot(e1);
    let d12 = e1.dot(e2);
    let d22 = e2.dot(e2);
    let r1 = r.dot(e1);
    let r2 = r.dot(e2);
    let det = d11 * d22 - d12 * d12;

    Some(Barycentric::new(
        (d22 * r1 - d12 * r2) / det,
        (d11 * r2 - d12 * r1) / det,
    ))
}
