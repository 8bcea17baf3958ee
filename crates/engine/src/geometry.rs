//! Surface geometry: indexed triangle data plus the handful of operations the
//! model pipeline consumes (bounds, center, rigid translation, point normals).

use glam::DVec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Compute the AABB of a point set. Empty input collapses to the origin.
    pub fn from_points(points: &[DVec3]) -> Self {
        let mut min = DVec3::splat(f64::MAX);
        let mut max = DVec3::splat(f64::MIN);

        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }

        if points.is_empty() {
            min = DVec3::ZERO;
            max = DVec3::ZERO;
        }

        Self { min, max }
    }

    /// Center of the bounding box
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}

/// Indexed triangle surface, optionally carrying per-point normals.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub points: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
    pub normals: Option<Vec<DVec3>>,
}

impl Geometry {
    pub fn new(points: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            points,
            triangles,
            normals: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }

    /// Geometric center (center of the bounding box, matching the source
    /// pipeline's centering step).
    pub fn center(&self) -> DVec3 {
        self.bounds().center()
    }

    /// Pure rigid translation: returns a translated copy, connectivity and
    /// normals unchanged.
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Geometry {
        let offset = DVec3::new(dx, dy, dz);
        Geometry {
            points: self.points.iter().map(|p| *p + offset).collect(),
            triangles: self.triangles.clone(),
            normals: self.normals.clone(),
        }
    }

    /// Returns a copy augmented with per-point normals: area-weighted
    /// accumulation of incident triangle normals, then normalized.
    pub fn with_point_normals(&self) -> Geometry {
        let mut normals = vec![DVec3::ZERO; self.points.len()];

        for tri in &self.triangles {
            let v0 = self.points[tri[0] as usize];
            let v1 = self.points[tri[1] as usize];
            let v2 = self.points[tri[2] as usize];
            // Cross product length encodes the triangle area weighting
            let face = (v1 - v0).cross(v2 - v0);
            for idx in tri {
                normals[*idx as usize] += face;
            }
        }

        for n in &mut normals {
            let len = n.length();
            if len > f64::EPSILON {
                *n /= len;
            }
        }

        Geometry {
            points: self.points.clone(),
            triangles: self.triangles.clone(),
            normals: Some(normals),
        }
    }
}
