//! Procedural meshes.
//!
//! All generators build left-handed geometry with clockwise front faces, the
//! same convention the pipelines use for culling.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::{
    mesh::MeshData,
    vertex::{BasicVertex, ColorVertex},
};

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
pub const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

/// Unit cube spanning `-1..1` with a different colour on each corner.
pub fn colored_cube() -> MeshData<ColorVertex> {
    let vertices = vec![
        ColorVertex::new([-1.0, -1.0, -1.0], WHITE),
        ColorVertex::new([-1.0, 1.0, -1.0], BLACK),
        ColorVertex::new([1.0, 1.0, -1.0], RED),
        ColorVertex::new([1.0, -1.0, -1.0], GREEN),
        ColorVertex::new([-1.0, -1.0, 1.0], BLUE),
        ColorVertex::new([-1.0, 1.0, 1.0], YELLOW),
        ColorVertex::new([1.0, 1.0, 1.0], CYAN),
        ColorVertex::new([1.0, -1.0, 1.0], MAGENTA),
    ];
    #[rustfmt::skip]
    let indices = vec![
        // front
        0, 1, 2, 0, 2, 3,
        // back
        4, 6, 5, 4, 7, 6,
        // left
        4, 5, 1, 4, 1, 0,
        // right
        3, 2, 6, 3, 6, 7,
        // top
        1, 5, 6, 1, 6, 2,
        // bottom
        4, 0, 3, 4, 3, 7,
    ];
    MeshData::new(vertices, indices)
}

/// Box with per-face normals and texture coordinates, centred at the origin.
pub fn lit_box(width: f32, height: f32, depth: f32) -> MeshData<BasicVertex> {
    let (w, h, d) = (0.5 * width, 0.5 * height, 0.5 * depth);
    let v = BasicVertex::new;
    #[rustfmt::skip]
    let vertices = vec![
        // front
        v([-w, -h, -d], [0.0, 0.0, -1.0], [0.0, 1.0]),
        v([-w,  h, -d], [0.0, 0.0, -1.0], [0.0, 0.0]),
        v([ w,  h, -d], [0.0, 0.0, -1.0], [1.0, 0.0]),
        v([ w, -h, -d], [0.0, 0.0, -1.0], [1.0, 1.0]),
        // back
        v([-w, -h,  d], [0.0, 0.0, 1.0], [1.0, 1.0]),
        v([ w, -h,  d], [0.0, 0.0, 1.0], [0.0, 1.0]),
        v([ w,  h,  d], [0.0, 0.0, 1.0], [0.0, 0.0]),
        v([-w,  h,  d], [0.0, 0.0, 1.0], [1.0, 0.0]),
        // top
        v([-w,  h, -d], [0.0, 1.0, 0.0], [0.0, 1.0]),
        v([-w,  h,  d], [0.0, 1.0, 0.0], [0.0, 0.0]),
        v([ w,  h,  d], [0.0, 1.0, 0.0], [1.0, 0.0]),
        v([ w,  h, -d], [0.0, 1.0, 0.0], [1.0, 1.0]),
        // bottom
        v([-w, -h, -d], [0.0, -1.0, 0.0], [1.0, 1.0]),
        v([ w, -h, -d], [0.0, -1.0, 0.0], [0.0, 1.0]),
        v([ w, -h,  d], [0.0, -1.0, 0.0], [0.0, 0.0]),
        v([-w, -h,  d], [0.0, -1.0, 0.0], [1.0, 0.0]),
        // left
        v([-w, -h,  d], [-1.0, 0.0, 0.0], [0.0, 1.0]),
        v([-w,  h,  d], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        v([-w,  h, -d], [-1.0, 0.0, 0.0], [1.0, 0.0]),
        v([-w, -h, -d], [-1.0, 0.0, 0.0], [1.0, 1.0]),
        // right
        v([ w, -h, -d], [1.0, 0.0, 0.0], [0.0, 1.0]),
        v([ w,  h, -d], [1.0, 0.0, 0.0], [0.0, 0.0]),
        v([ w,  h,  d], [1.0, 0.0, 0.0], [1.0, 0.0]),
        v([ w, -h,  d], [1.0, 0.0, 0.0], [1.0, 1.0]),
    ];
    let indices = (0..6u32)
        .flat_map(|face| {
            let b = 4 * face;
            [b, b + 1, b + 2, b, b + 2, b + 3]
        })
        .collect();
    MeshData::new(vertices, indices)
}

/// `m` x `n` vertex grid in the xz-plane centred at the origin. Rows run from
/// `+depth/2` to `-depth/2`, columns from `-width/2` to `+width/2`.
pub fn grid(width: f32, depth: f32, m: u32, n: u32) -> MeshData<BasicVertex> {
    let (m, n) = (m.max(2), n.max(2));
    let half_width = 0.5 * width;
    let half_depth = 0.5 * depth;
    let dx = width / (n - 1) as f32;
    let dz = depth / (m - 1) as f32;
    let du = 1.0 / (n - 1) as f32;
    let dv = 1.0 / (m - 1) as f32;

    let mut vertices = Vec::with_capacity((m * n) as usize);
    for i in 0..m {
        let z = half_depth - i as f32 * dz;
        for j in 0..n {
            let x = -half_width + j as f32 * dx;
            vertices.push(BasicVertex::new(
                [x, 0.0, z],
                [0.0, 1.0, 0.0],
                [j as f32 * du, i as f32 * dv],
            ));
        }
    }

    let mut indices = Vec::with_capacity(6 * ((m - 1) * (n - 1)) as usize);
    for i in 0..m - 1 {
        for j in 0..n - 1 {
            indices.extend_from_slice(&[
                i * n + j,
                i * n + j + 1,
                (i + 1) * n + j,
                (i + 1) * n + j,
                i * n + j + 1,
                (i + 1) * n + j + 1,
            ]);
        }
    }
    MeshData::new(vertices, indices)
}

pub fn hill_height(x: f32, z: f32) -> f32 {
    0.3 * (z * (0.1 * x).sin() + x * (0.1 * z).cos())
}

/// Analytic normal of [`hill_height`].
pub fn hill_normal(x: f32, z: f32) -> [f32; 3] {
    let n = Vector3::new(
        -0.03 * z * (0.1 * x).cos() - 0.3 * (0.1 * z).cos(),
        1.0,
        -0.3 * (0.1 * x).sin() + 0.03 * x * (0.1 * z).sin(),
    )
    .normalize();
    n.into()
}

/// A grid displaced into rolling hills.
pub fn hills(width: f32, depth: f32, m: u32, n: u32) -> MeshData<BasicVertex> {
    grid(width, depth, m, n).map_vertices(|mut v| {
        let [x, _, z] = v.position;
        v.position[1] = hill_height(x, z);
        v.normal = hill_normal(x, z);
        v
    })
}

/// UV sphere with `slices` around the y axis and `stacks` from pole to pole.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> MeshData<BasicVertex> {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::new();

    vertices.push(BasicVertex::new([0.0, radius, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
    let phi_step = PI / stacks as f32;
    let theta_step = 2.0 * PI / slices as f32;
    for i in 1..stacks {
        let phi = i as f32 * phi_step;
        for j in 0..=slices {
            let theta = j as f32 * theta_step;
            let p = Vector3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.cos(),
                radius * phi.sin() * theta.sin(),
            );
            vertices.push(BasicVertex::new(
                p.into(),
                p.normalize().into(),
                [theta / (2.0 * PI), phi / PI],
            ));
        }
    }
    vertices.push(BasicVertex::new([0.0, -radius, 0.0], [0.0, -1.0, 0.0], [0.0, 1.0]));

    let mut indices = Vec::new();
    for i in 1..=slices {
        indices.extend_from_slice(&[0, i + 1, i]);
    }

    let base = 1;
    let ring = slices + 1;
    for i in 0..stacks - 2 {
        for j in 0..slices {
            indices.extend_from_slice(&[
                base + i * ring + j,
                base + i * ring + j + 1,
                base + (i + 1) * ring + j,
                base + (i + 1) * ring + j,
                base + i * ring + j + 1,
                base + (i + 1) * ring + j + 1,
            ]);
        }
    }

    let south = vertices.len() as u32 - 1;
    let base = south - ring;
    for i in 0..slices {
        indices.extend_from_slice(&[south, base + i, base + i + 1]);
    }
    MeshData::new(vertices, indices)
}

/// World axes as a line list: x red, y green, z blue, long enough to reach
/// the far plane.
pub fn basis_lines() -> MeshData<ColorVertex> {
    let vertices = vec![
        ColorVertex::new([0.0, 0.0, 0.0], WHITE),
        ColorVertex::new([1.0e6, 0.0, 0.0], RED),
        ColorVertex::new([0.0, 1.0e6, 0.0], GREEN),
        ColorVertex::new([0.0, 0.0, 1.0e6], BLUE),
    ];
    MeshData::new(vertices, vec![0, 1, 0, 2, 0, 3])
}
