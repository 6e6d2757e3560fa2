//! First person camera.
//!
//! The camera keeps an explicit right/up/look basis in a left-handed world
//! (+x right, +y up, +z into the screen) and caches both the view and the
//! projection matrix. Projection maps depth to `0..1` which is what wgpu
//! expects, so no correction matrix is needed.

use cgmath::{InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::input::InputManager;

#[derive(Clone, Debug)]
pub struct Camera {
    position: Point3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    look: Vector3<f32>,

    near_z: f32,
    far_z: f32,
    aspect: f32,
    fov_y: f32,
    near_window_height: f32,
    far_window_height: f32,

    view: Matrix4<f32>,
    proj: Matrix4<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Point3::new(0.0, 0.0, 0.0),
            right: Vector3::unit_x(),
            up: Vector3::unit_y(),
            look: Vector3::unit_z(),
            near_z: 0.0,
            far_z: 0.0,
            aspect: 0.0,
            fov_y: 0.0,
            near_window_height: 0.0,
            far_window_height: 0.0,
            view: Matrix4::from_scale(1.0),
            proj: Matrix4::from_scale(1.0),
        };
        camera.set_lens(0.25 * std::f32::consts::PI, 1.0, 1.0, 1000.0);
        camera.update_view_matrix();
        camera
    }
}

impl Camera {
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn look(&self) -> Vector3<f32> {
        self.look
    }

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn fov_x(&self) -> f32 {
        let half_width = 0.5 * self.near_window_width();
        2.0 * (half_width / self.near_z).atan()
    }

    pub fn near_window_width(&self) -> f32 {
        self.aspect * self.near_window_height
    }

    pub fn near_window_height(&self) -> f32 {
        self.near_window_height
    }

    pub fn far_window_width(&self) -> f32 {
        self.aspect * self.far_window_height
    }

    pub fn far_window_height(&self) -> f32 {
        self.far_window_height
    }

    pub fn view(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn proj(&self) -> Matrix4<f32> {
        self.proj
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.proj * self.view
    }

    /// Sets the frustum and rebuilds the projection matrix.
    pub fn set_lens(&mut self, fov_y: f32, aspect: f32, zn: f32, zf: f32) {
        self.fov_y = fov_y;
        self.aspect = aspect;
        self.near_z = zn;
        self.far_z = zf;

        let half_tan = (0.5 * fov_y).tan();
        self.near_window_height = 2.0 * zn * half_tan;
        self.far_window_height = 2.0 * zf * half_tan;

        self.proj = perspective_lh(fov_y, aspect, zn, zf);
    }

    /// Only the aspect ratio changes on resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.set_lens(self.fov_y, aspect, self.near_z, self.far_z);
    }

    pub fn look_at(&mut self, pos: Point3<f32>, target: Point3<f32>, world_up: Vector3<f32>) {
        let look = (target - pos).normalize();
        let right = world_up.cross(look).normalize();
        let up = look.cross(right);

        self.position = pos;
        self.look = look;
        self.right = right;
        self.up = up;
        self.update_view_matrix();
    }

    pub fn strafe(&mut self, d: f32) {
        self.position += d * self.right;
    }

    pub fn walk(&mut self, d: f32) {
        self.position += d * self.look;
    }

    /// Moves along the world up axis, independent of where the camera looks.
    pub fn jump(&mut self, d: f32) {
        self.position += d * Vector3::unit_y();
    }

    pub fn pitch(&mut self, angle: f32) {
        let r = Matrix3::from_axis_angle(self.right, Rad(angle));
        self.up = r * self.up;
        self.look = r * self.look;
    }

    pub fn rotate_y(&mut self, angle: f32) {
        let r = Matrix3::from_angle_y(Rad(angle));
        self.right = r * self.right;
        self.up = r * self.up;
        self.look = r * self.look;
    }

    pub fn update_view_matrix(&mut self) {
        // Rounding errors accumulate over many small rotations.
        let look = self.look.normalize();
        let up = look.cross(self.right).normalize();
        let right = up.cross(look);

        let p = Vector3::new(self.position.x, self.position.y, self.position.z);
        let x = -p.dot(right);
        let y = -p.dot(up);
        let z = -p.dot(look);

        self.right = right;
        self.up = up;
        self.look = look;

        #[rustfmt::skip]
        let view = Matrix4::new(
            right.x, up.x, look.x, 0.0,
            right.y, up.y, look.y, 0.0,
            right.z, up.z, look.z, 0.0,
            x,       y,    z,      1.0,
        );
        self.view = view;
    }
}

/// Left-handed perspective projection with depth in `0..1`.
pub fn perspective_lh(fov_y: f32, aspect: f32, zn: f32, zf: f32) -> Matrix4<f32> {
    let ys = 1.0 / (0.5 * fov_y).tan();
    let xs = ys / aspect;
    let range = zf / (zf - zn);
    #[rustfmt::skip]
    let proj = Matrix4::new(
        xs,  0.0, 0.0,          0.0,
        0.0, ys,  0.0,          0.0,
        0.0, 0.0, range,        1.0,
        0.0, 0.0, -zn * range,  0.0,
    );
    proj
}

/// Moves a [`Camera`] from keyboard and mouse state.
///
/// W/S walk, A/D strafe, Space/LeftShift move up and down. Mouse movement
/// turns the camera while the right button is held.
#[derive(Clone, Debug)]
pub struct CameraController {
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse movement.
    pub sensitivity: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self { speed, sensitivity }
    }

    pub fn update_camera(&self, camera: &mut Camera, input: &mut InputManager, dt: f32) {
        let step = self.speed * dt;
        if input.key_state(KeyCode::KeyW) {
            camera.walk(step);
        }
        if input.key_state(KeyCode::KeyS) {
            camera.walk(-step);
        }
        if input.key_state(KeyCode::KeyA) {
            camera.strafe(-step);
        }
        if input.key_state(KeyCode::KeyD) {
            camera.strafe(step);
        }
        if input.key_state(KeyCode::Space) {
            camera.jump(step);
        }
        if input.key_state(KeyCode::ShiftLeft) {
            camera.jump(-step);
        }

        let (dx, dy) = input.mouse_delta_pos();
        if input.mouse_state(MouseButton::Right) && (dx != 0.0 || dy != 0.0) {
            let dx = (self.sensitivity * dx).to_radians();
            let dy = (self.sensitivity * dy).to_radians();
            camera.pitch(dy);
            camera.rotate_y(dx);
        }

        camera.update_view_matrix();
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(10.0, 0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Transform, Vector4};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn lens_caches_window_sizes() {
        let mut camera = Camera::default();
        camera.set_lens(std::f32::consts::FRAC_PI_2, 2.0, 1.0, 100.0);
        assert!(approx(camera.near_window_height(), 2.0));
        assert!(approx(camera.near_window_width(), 4.0));
        assert!(approx(camera.far_window_height(), 200.0));
        assert!(approx(camera.fov_x(), 2.0 * 2.0f32.atan()));
    }

    #[test]
    fn look_at_builds_orthonormal_left_handed_basis() {
        let mut camera = Camera::default();
        camera.look_at(
            Point3::new(0.0, 2.0, -15.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let (r, u, l) = (camera.right(), camera.up(), camera.look());
        assert!(approx(r.dot(u), 0.0));
        assert!(approx(r.dot(l), 0.0));
        assert!(approx(u.dot(l), 0.0));
        assert!(approx(r.x, 1.0));
        // Target ends up straight ahead in view space.
        let target = camera.view().transform_point(Point3::new(0.0, 0.0, 0.0));
        assert!(approx(target.x, 0.0));
        assert!(approx(target.y, 0.0));
        assert!(target.z > 0.0);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let proj = perspective_lh(std::f32::consts::FRAC_PI_4, 1.0, 1.0, 100.0);
        let near = proj * Vector4::new(0.0, 0.0, 1.0, 1.0);
        let far = proj * Vector4::new(0.0, 0.0, 100.0, 1.0);
        assert!(approx(near.z / near.w, 0.0));
        assert!(approx(far.z / far.w, 1.0));
    }

    #[test]
    fn walk_strafe_jump_move_along_basis() {
        let mut camera = Camera::default();
        camera.walk(2.0);
        camera.strafe(1.0);
        camera.jump(3.0);
        assert_eq!(camera.position(), Point3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn rotate_y_turns_look_towards_right() {
        let mut camera = Camera::default();
        camera.rotate_y(std::f32::consts::FRAC_PI_2);
        camera.update_view_matrix();
        assert!(approx(camera.look().x, 1.0));
        assert!(approx(camera.right().z, -1.0));
    }

    #[test]
    fn controller_walks_on_key_press() {
        let mut camera = Camera::default();
        let mut input = InputManager::default();
        input.set_key_state(KeyCode::KeyW, true);
        CameraController::new(10.0, 0.25).update_camera(&mut camera, &mut input, 0.5);
        assert!(approx(camera.position().z, 5.0));
    }

    #[test]
    fn controller_ignores_mouse_without_right_button() {
        let mut camera = Camera::default();
        let mut input = InputManager::default();
        input.set_mouse_pos(0.0, 0.0);
        input.set_mouse_pos(40.0, 0.0);
        CameraController::default().update_camera(&mut camera, &mut input, 0.016);
        assert!(approx(camera.look().z, 1.0));
    }
}
