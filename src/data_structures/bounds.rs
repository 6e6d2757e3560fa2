//! Axis-aligned boxes and view frustums.
//!
//! Both are used twice: the picker rejects rays that miss an object's box
//! before testing triangles, and the terrain culls patches whose box lies
//! outside the camera frustum.

use cgmath::{InnerSpace, Matrix, Matrix4, Point3, Vector3, Vector4};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f32; 3]>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = Point3::from(first);
        let mut max = min;
        for [x, y, z] in iter {
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        }
        Some(Self { min, max })
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            0.5 * (self.min.x + self.max.x),
            0.5 * (self.min.y + self.max.y),
            0.5 * (self.min.z + self.max.z),
        )
    }

    /// Half size along each axis.
    pub fn extents(&self) -> Vector3<f32> {
        0.5 * (self.max - self.min)
    }
}

/// `normal · p + d = 0`, normal pointing to the inside of the frustum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    fn from_row(v: Vector4<f32>) -> Self {
        let normal = Vector3::new(v.x, v.y, v.z);
        let len = normal.magnitude();
        if len <= f32::EPSILON {
            return Self { normal, d: v.w };
        }
        Self {
            normal: normal / len,
            d: v.w / len,
        }
    }

    pub fn signed_distance(&self, p: Point3<f32>) -> f32 {
        self.normal.dot(Vector3::new(p.x, p.y, p.z)) + self.d
    }
}

/// Six planes in the order left, right, bottom, top, near, far.
#[derive(Copy, Clone, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the world space planes from a view-projection matrix that maps
    /// depth to `0..1`.
    pub fn from_view_proj(m: &Matrix4<f32>) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        Self {
            planes: [
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 + r1),
                Plane::from_row(r3 - r1),
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
            ],
        }
    }

    /// False only when the box lies entirely behind one of the planes.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let c = aabb.center();
        let e = aabb.extents();
        self.planes.iter().all(|plane| {
            let n = plane.normal;
            let radius = n.x.abs() * e.x + n.y.abs() * e.y + n.z.abs() * e.z;
            plane.signed_distance(c) + radius >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn aabb_of_points() {
        let aabb = Aabb::from_points([[1.0, -2.0, 3.0], [-1.0, 4.0, 0.0], [0.0, 0.0, 5.0]])
            .unwrap();
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 4.0, 5.0));
        assert_eq!(aabb.center(), Point3::new(0.0, 1.0, 2.5));
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn frustum_keeps_boxes_in_front_and_culls_behind() {
        let mut camera = Camera::default();
        camera.set_lens(std::f32::consts::FRAC_PI_4, 1.0, 1.0, 100.0);
        camera.look_at(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Vector3::unit_y(),
        );
        let frustum = Frustum::from_view_proj(&camera.view_proj());

        let in_front = Aabb::new(Point3::new(-1.0, -1.0, 9.0), Point3::new(1.0, 1.0, 11.0));
        let behind = Aabb::new(Point3::new(-1.0, -1.0, -11.0), Point3::new(1.0, 1.0, -9.0));
        let too_far = Aabb::new(Point3::new(-1.0, -1.0, 200.0), Point3::new(1.0, 1.0, 210.0));
        let off_side = Aabb::new(Point3::new(50.0, -1.0, 9.0), Point3::new(52.0, 1.0, 11.0));
        assert!(frustum.intersects_aabb(&in_front));
        assert!(!frustum.intersects_aabb(&behind));
        assert!(!frustum.intersects_aabb(&too_far));
        assert!(!frustum.intersects_aabb(&off_side));
    }
}
