//! Volumetric grid data (scan slices) and iso-surface extraction.

use glam::DVec3;

use crate::geometry::{Aabb, Geometry};

/// Regular 3D grid of scalar samples.
#[derive(Debug, Clone)]
pub struct Volume {
    /// Sample counts along X, Y, Z
    pub dims: [usize; 3],
    /// Sample spacing along each axis
    pub spacing: DVec3,
    /// World position of sample (0, 0, 0)
    pub origin: DVec3,
    /// Samples in X-fastest order: `index = x + dims[0] * (y + dims[1] * z)`
    pub samples: Vec<f64>,
}

impl Volume {
    pub fn new(dims: [usize; 3], spacing: DVec3, origin: DVec3, samples: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), dims[0] * dims[1] * dims[2]);
        Self {
            dims,
            spacing,
            origin,
            samples,
        }
    }

    pub fn sample(&self, x: usize, y: usize, z: usize) -> f64 {
        self.samples[x + self.dims[0] * (y + self.dims[1] * z)]
    }

    /// Bounding box spanned by the sample positions.
    pub fn bounds(&self) -> Aabb {
        let extent = DVec3::new(
            self.dims[0].saturating_sub(1) as f64 * self.spacing.x,
            self.dims[1].saturating_sub(1) as f64 * self.spacing.y,
            self.dims[2].saturating_sub(1) as f64 * self.spacing.z,
        );
        Aabb {
            min: self.origin,
            max: self.origin + extent,
        }
    }
}

/// Offsets to the six axis neighbors, paired with the face axis and direction.
const FACE_DIRECTIONS: [(i64, i64, i64); 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Derive a surface from a volume at the given threshold.
///
/// Each sample at or above the threshold is treated as a filled voxel cell;
/// every cell face adjoining an empty (or out-of-grid) cell contributes a quad
/// to the output surface. With `compute_normals` the result carries per-point
/// normals, which for the unshared quad vertices are the face normals.
pub fn extract_iso_surface(volume: &Volume, threshold: f64, compute_normals: bool) -> Geometry {
    let mut geometry = Geometry::default();
    let half = volume.spacing * 0.5;

    let inside = |x: i64, y: i64, z: i64| -> bool {
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= volume.dims[0]
            || y as usize >= volume.dims[1]
            || z as usize >= volume.dims[2]
        {
            return false;
        }
        volume.sample(x as usize, y as usize, z as usize) >= threshold
    };

    for z in 0..volume.dims[2] as i64 {
        for y in 0..volume.dims[1] as i64 {
            for x in 0..volume.dims[0] as i64 {
                if !inside(x, y, z) {
                    continue;
                }
                let center = volume.origin
                    + DVec3::new(
                        x as f64 * volume.spacing.x,
                        y as f64 * volume.spacing.y,
                        z as f64 * volume.spacing.z,
                    );
                for (dx, dy, dz) in FACE_DIRECTIONS {
                    if !inside(x + dx, y + dy, z + dz) {
                        push_face(&mut geometry, center, half, DVec3::new(dx as f64, dy as f64, dz as f64));
                    }
                }
            }
        }
    }

    if compute_normals {
        geometry.with_point_normals()
    } else {
        geometry
    }
}

/// Append one outward-facing voxel face quad (two triangles).
fn push_face(geometry: &mut Geometry, center: DVec3, half: DVec3, normal: DVec3) {
    // Build an orthonormal frame on the face plane
    let (u, v) = if normal.x != 0.0 {
        (DVec3::Y * half.y, DVec3::Z * half.z)
    } else if normal.y != 0.0 {
        (DVec3::Z * half.z, DVec3::X * half.x)
    } else {
        (DVec3::X * half.x, DVec3::Y * half.y)
    };
    let face_center = center + normal * half;

    let base = geometry.points.len() as u32;
    let corners = [
        face_center - u - v,
        face_center + u - v,
        face_center + u + v,
        face_center - u + v,
    ];
    geometry.points.extend_from_slice(&corners);

    // Winding chosen so (p1 - p0) x (p2 - p0) points along `normal`
    let flip = {
        let e1 = corners[1] - corners[0];
        let e2 = corners[2] - corners[0];
        e1.cross(e2).dot(normal) < 0.0
    };
    if flip {
        geometry.triangles.push([base, base + 2, base + 1]);
        geometry.triangles.push([base, base + 3, base + 2]);
    } else {
        geometry.triangles.push([base, base + 1, base + 2]);
        geometry.triangles.push([base, base + 2, base + 3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_voxel() -> Volume {
        Volume::new([1, 1, 1], DVec3::ONE, DVec3::ZERO, vec![1.0])
    }

    #[test]
    fn test_volume_bounds() {
        let volume = Volume::new(
            [3, 2, 1],
            DVec3::new(0.5, 1.0, 2.0),
            DVec3::new(-1.0, 0.0, 4.0),
            vec![0.0; 6],
        );
        let bounds = volume.bounds();
        assert_eq!(bounds.min, DVec3::new(-1.0, 0.0, 4.0));
        assert_eq!(bounds.max, DVec3::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn test_single_voxel_extracts_cube() {
        let surface = extract_iso_surface(&single_voxel(), 0.1, false);
        // 6 faces, 2 triangles each, 4 unshared points each
        assert_eq!(surface.triangle_count(), 12);
        assert_eq!(surface.point_count(), 24);
        let bounds = surface.bounds();
        assert_eq!(bounds.min, DVec3::splat(-0.5));
        assert_eq!(bounds.max, DVec3::splat(0.5));
    }

    #[test]
    fn test_samples_below_threshold_are_empty() {
        let volume = Volume::new([2, 1, 1], DVec3::ONE, DVec3::ZERO, vec![0.05, 0.5]);
        let surface = extract_iso_surface(&volume, 0.1, false);
        // Only the second voxel is filled: a full cube again
        assert_eq!(surface.triangle_count(), 12);
        assert_eq!(surface.bounds().center(), DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_adjacent_voxels_drop_shared_faces() {
        let volume = Volume::new([2, 1, 1], DVec3::ONE, DVec3::ZERO, vec![1.0, 1.0]);
        let surface = extract_iso_surface(&volume, 0.1, false);
        // Two cubes sharing one interior face: 10 outward faces remain
        assert_eq!(surface.triangle_count(), 20);
    }

    #[test]
    fn test_extracted_normals_point_outward() {
        let surface = extract_iso_surface(&single_voxel(), 0.1, true);
        let normals = surface.normals.expect("normals requested");
        for (point, normal) in surface.points.iter().zip(&normals) {
            // For a cube centered at the origin every outward normal has a
            // positive dot product with its face-corner position.
            assert!(point.dot(*normal) > 0.0);
        }
    }
}
