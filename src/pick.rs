//! Object picking and selection.
//!
//! Picking happens on the CPU against the meshes that were uploaded to the GPU:
//!
//! 1. Build a ray through the clicked pixel in view space and move it to world space
//! 2. For every pickable object, move the ray into the object's local space
//! 3. Reject objects whose bounding box the ray misses
//! 4. Test the remaining triangles and keep the nearest hit across all objects
//!
//! The [`Picker`] remembers which object and triangle won so the scene can
//! draw the triangle highlighted. Clicking into empty space clears it.

use cgmath::{InnerSpace, Matrix4, MetricSpace, Point3, SquareMatrix, Transform, Vector3};

use crate::data_structures::bounds::Aabb;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// The direction is transformed but not renormalized.
    pub fn transform(&self, m: &Matrix4<f32>) -> Ray {
        Ray {
            origin: m.transform_point(self.origin),
            direction: m.transform_vector(self.direction),
        }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + t * self.direction
    }
}

/// World space ray through pixel `(sx, sy)` of a `width` x `height` viewport.
///
/// Returns `None` if the view matrix cannot be inverted.
pub fn pick_ray(
    sx: f32,
    sy: f32,
    width: f32,
    height: f32,
    proj: &Matrix4<f32>,
    view: &Matrix4<f32>,
) -> Option<Ray> {
    let vx = (2.0 * sx / width - 1.0) / proj[0][0];
    let vy = (-2.0 * sy / height + 1.0) / proj[1][1];
    let view_ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(vx, vy, 1.0));
    let inv_view = view.invert()?;
    let mut ray = view_ray.transform(&inv_view);
    ray.direction = ray.direction.normalize();
    Some(ray)
}

/// Slab test. Returns the distance to the entry point, or 0 if the origin is
/// inside the box.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
    let min = [aabb.min.x, aabb.min.y, aabb.min.z];
    let max = [aabb.max.x, aabb.max.y, aabb.max.z];

    let mut t_near = 0.0f32;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        if dir[axis].abs() < f32::EPSILON {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let mut t0 = (min[axis] - origin[axis]) * inv;
        let mut t1 = (max[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    Some(t_near)
}

/// Möller-Trumbore ray/triangle intersection. Both sides count as a hit,
/// hits behind the ray origin do not.
pub fn ray_triangle(
    ray: &Ray,
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
) -> Option<f32> {
    const EPS: f32 = 1e-7;
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let p = ray.direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > EPS).then_some(t)
}

/// Geometry of one pickable object.
#[derive(Copy, Clone, Debug)]
pub struct PickMesh<'a> {
    pub world: Matrix4<f32>,
    pub positions: &'a [[f32; 3]],
    pub indices: &'a [u32],
    pub aabb: Aabb,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub triangle: u32,
    /// World space distance from the ray origin.
    pub distance: f32,
}

/// Nearest triangle of `mesh` hit by a world space ray.
pub fn pick_mesh(ray_world: &Ray, mesh: &PickMesh<'_>) -> Option<Hit> {
    let inv_world = mesh.world.invert()?;
    let mut ray = ray_world.transform(&inv_world);
    ray.direction = ray.direction.normalize();

    ray_aabb(&ray, &mesh.aabb)?;

    let mut best: Option<(u32, f32)> = None;
    for (triangle, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let vertex = |i: u32| mesh.positions.get(i as usize).map(|p| Point3::from(*p));
        let (Some(v0), Some(v1), Some(v2)) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2]))
        else {
            log::warn!("triangle {triangle} references a vertex outside the mesh");
            continue;
        };
        if let Some(t) = ray_triangle(&ray, v0, v1, v2) {
            if best.is_none_or(|(_, best_t)| t < best_t) {
                best = Some((triangle as u32, t));
            }
        }
    }

    best.map(|(triangle, t)| {
        let hit = mesh.world.transform_point(ray.at(t));
        Hit {
            triangle,
            distance: ray_world.origin.distance(hit),
        }
    })
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Picked {
    pub object_id: u32,
    pub triangle: u32,
    pub distance: f32,
}

/// Holds the currently selected triangle across all objects.
#[derive(Debug, Default, Clone)]
pub struct Picker {
    picked: Option<Picked>,
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn picked(&self) -> Option<Picked> {
        self.picked
    }

    /// Picked triangle of `object_id`, if that object holds the selection.
    pub fn triangle_of(&self, object_id: u32) -> Option<u32> {
        self.picked
            .filter(|p| p.object_id == object_id)
            .map(|p| p.triangle)
    }

    pub fn clear(&mut self) {
        self.picked = None;
    }

    /// Replaces the selection by the nearest hit among `candidates`. Nothing
    /// hit clears the selection.
    pub fn pick<'a, I>(&mut self, ray: &Ray, candidates: I) -> Option<Picked>
    where
        I: IntoIterator<Item = (u32, PickMesh<'a>)>,
    {
        self.picked = candidates
            .into_iter()
            .filter_map(|(object_id, mesh)| {
                pick_mesh(ray, &mesh).map(|hit| Picked {
                    object_id,
                    triangle: hit.triangle,
                    distance: hit.distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));
        match self.picked {
            Some(p) => log::debug!(
                "picked triangle {} of object {} at distance {:.2}",
                p.triangle,
                p.object_id,
                p.distance
            ),
            None => log::debug!("pick ray hit nothing"),
        }
        self.picked
    }
}
