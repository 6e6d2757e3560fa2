//! Position, rotation and scale of a scene object.

use std::ops::Mul;

use cgmath::{Matrix4, One, Quaternion, Vector3};

/// Translation, rotation (as quaternion) and non-uniform scale.
///
/// `to_matrix` applies scale first, then rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn with_scale(mut self, s: f32) -> Self {
        self.scale = Vector3::new(s, s, s);
        self
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Self::from_position(position)
    }
}

/// Parent * child: the child transform expressed in the parent's space.
impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Transform {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Self::Output {
        &self * &rhs
    }
}

/// Texture coordinate transform: tile by `(su, sv)` and scroll by `offset`.
pub fn tex_transform(su: f32, sv: f32, offset: [f32; 2]) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(offset[0], offset[1], 0.0))
        * Matrix4::from_nonuniform_scale(su, sv, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3, Transform as _, Point3};

    fn approx(a: Point3<f32>, b: Point3<f32>) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    #[test]
    fn composition_matches_matrix_product() {
        let parent = Transform {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Quaternion::from_angle_y(Deg(90.0)),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let child = Transform::from_position(Vector3::new(1.0, 0.0, 0.0));
        let composed = (&parent * &child).to_matrix();
        let product = parent.to_matrix() * child.to_matrix();
        let p = Point3::new(0.5, -1.0, 2.0);
        assert!(approx(composed.transform_point(p), product.transform_point(p)));
    }

    #[test]
    fn tex_transform_tiles_then_scrolls() {
        let m = tex_transform(5.0, 5.0, [0.25, 0.0]);
        let uv = m.transform_point(Point3::new(1.0, 1.0, 0.0));
        assert!(approx(uv, Point3::new(5.25, 5.0, 0.0)));
    }
}
