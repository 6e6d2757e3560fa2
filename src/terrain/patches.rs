//! Patch layout, level-of-detail selection and crack stitching.
//!
//! The terrain is split into patches of `CELLS_PER_PATCH` x `CELLS_PER_PATCH`
//! cells. Every frame each patch gets a level `n` from its distance to the
//! eye and is drawn as a `2^n` x `2^n` grid. Where two patches with different
//! levels meet, the finer one snaps its edge vertices onto the coarser edge
//! in the vertex shader. The edge levels passed along with each instance say
//! which edges need that.

use anyhow::ensure;
use cgmath::{MetricSpace, Point3};

use super::{CELLS_PER_PATCH, heightmap::Heightmap};
use crate::data_structures::{
    bounds::{Aabb, Frustum},
    mesh::MeshData,
    vertex::Vertex,
};

/// Finest level: one grid cell per heightmap cell.
pub const MAX_LEVEL: u32 = CELLS_PER_PATCH.trailing_zeros();

/// Distances and levels for the LOD ramp. Closer than `min_dist` draws at
/// `max_tess`, farther than `max_dist` at `min_tess`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LodSettings {
    pub min_dist: f32,
    pub max_dist: f32,
    pub min_tess: u32,
    pub max_tess: u32,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            min_dist: 20.0,
            max_dist: 500.0,
            min_tess: 0,
            max_tess: 6,
        }
    }
}

impl LodSettings {
    pub fn level(&self, distance: f32) -> u32 {
        let range = (self.max_dist - self.min_dist).max(f32::EPSILON);
        let s = ((distance - self.min_dist) / range).clamp(0.0, 1.0);
        let max = self.max_tess.min(MAX_LEVEL) as f32;
        let min = self.min_tess.min(MAX_LEVEL) as f32;
        (max + (min - max) * s).round() as u32
    }
}

/// Control point of the patch grid. Every patch stores its vertical bounds
/// on its upper left control point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PatchVertex {
    pub position: [f32; 3],
    pub tex: [f32; 2],
    pub bounds_y: [f32; 2],
}

/// Where the patches of a heightmap lie.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PatchLayout {
    pub vert_rows: u32,
    pub vert_cols: u32,
    pub width: f32,
    pub depth: f32,
}

impl PatchLayout {
    pub fn new(heightmap: &Heightmap) -> anyhow::Result<Self> {
        let (w, h) = (heightmap.samples_wide(), heightmap.samples_deep());
        ensure!(
            (w - 1) % CELLS_PER_PATCH == 0 && (h - 1) % CELLS_PER_PATCH == 0,
            "terrain heightmap {w}x{h}: width - 1 and height - 1 must be multiples of {CELLS_PER_PATCH}"
        );
        Ok(Self {
            vert_rows: (h - 1) / CELLS_PER_PATCH + 1,
            vert_cols: (w - 1) / CELLS_PER_PATCH + 1,
            width: heightmap.width(),
            depth: heightmap.depth(),
        })
    }

    pub fn patch_rows(&self) -> u32 {
        self.vert_rows - 1
    }

    pub fn patch_cols(&self) -> u32 {
        self.vert_cols - 1
    }

    pub fn patch_count(&self) -> usize {
        (self.patch_rows() * self.patch_cols()) as usize
    }

    pub fn patch_id(&self, i: u32, j: u32) -> usize {
        (i * self.patch_cols() + j) as usize
    }

    pub fn build_patch_vertices(&self, heightmap: &Heightmap) -> Vec<PatchVertex> {
        let patch_width = self.width / self.patch_cols() as f32;
        let patch_depth = self.depth / self.patch_rows() as f32;
        let du = 1.0 / self.patch_cols() as f32;
        let dv = 1.0 / self.patch_rows() as f32;

        let mut vertices = Vec::with_capacity((self.vert_rows * self.vert_cols) as usize);
        for i in 0..self.vert_rows {
            let z = 0.5 * self.depth - i as f32 * patch_depth;
            for j in 0..self.vert_cols {
                let x = -0.5 * self.width + j as f32 * patch_width;
                let bounds_y = if i < self.patch_rows() && j < self.patch_cols() {
                    let (min, max) = heightmap.patch_bounds_y(i, j);
                    [min, max]
                } else {
                    [0.0, 0.0]
                };
                vertices.push(PatchVertex {
                    position: [x, 0.0, z],
                    tex: [j as f32 * du, i as f32 * dv],
                    bounds_y,
                });
            }
        }
        vertices
    }

    /// Four control points per patch: upper left, upper right, lower left, lower right.
    pub fn build_patch_indices(&self) -> Vec<u32> {
        let cols = self.vert_cols;
        let mut indices = Vec::with_capacity(self.patch_count() * 4);
        for i in 0..self.patch_rows() {
            for j in 0..self.patch_cols() {
                indices.extend_from_slice(&[
                    i * cols + j,
                    i * cols + j + 1,
                    (i + 1) * cols + j,
                    (i + 1) * cols + j + 1,
                ]);
            }
        }
        indices
    }
}

/// A patch in world space, derived from its four control points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Patch {
    pub row: u32,
    pub col: u32,
    pub aabb: Aabb,
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub uv_origin: [f32; 2],
    pub uv_size: [f32; 2],
}

/// Per-instance data of one drawn patch (vertex buffer slot 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PatchInstance {
    /// World x and z of the upper left corner.
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub uv_origin: [f32; 2],
    pub uv_size: [f32; 2],
    pub level: u32,
    /// Top, right, bottom, left.
    pub edges: [u32; 4],
}

impl Vertex for PatchInstance {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
            1 => Float32x2,
            2 => Float32x2,
            3 => Float32x2,
            4 => Float32x2,
            5 => Uint32,
            6 => Uint32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PatchInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Vertex of a unit patch grid, `0..1` on both axes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub local: [f32; 2],
}

impl Vertex for GridVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// `(2^level + 1)^2` vertices, triangulated like [`crate::geometry::grid`].
pub fn unit_grid(level: u32) -> MeshData<GridVertex> {
    let cells = 1u32 << level.min(MAX_LEVEL);
    let n = cells + 1;
    let step = 1.0 / cells as f32;

    let mut vertices = Vec::with_capacity((n * n) as usize);
    for i in 0..n {
        for j in 0..n {
            vertices.push(GridVertex {
                local: [j as f32 * step, i as f32 * step],
            });
        }
    }

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for i in 0..cells {
        for j in 0..cells {
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

/// Every patch of a terrain, in row-major order.
#[derive(Clone, Debug)]
pub struct PatchSet {
    layout: PatchLayout,
    patches: Vec<Patch>,
}

/// Instances of one frame grouped by level, index = level.
pub type LodBatches = Vec<Vec<PatchInstance>>;

impl PatchSet {
    pub fn new(heightmap: &Heightmap) -> anyhow::Result<Self> {
        let layout = PatchLayout::new(heightmap)?;
        let vertices = layout.build_patch_vertices(heightmap);
        let indices = layout.build_patch_indices();
        Ok(Self::from_control_points(layout, &vertices, &indices))
    }

    pub fn from_control_points(layout: PatchLayout, vertices: &[PatchVertex], indices: &[u32]) -> Self {
        let patches = indices
            .chunks_exact(4)
            .enumerate()
            .map(|(id, quad)| {
                let ul = vertices[quad[0] as usize];
                let lr = vertices[quad[3] as usize];
                let [min_y, max_y] = ul.bounds_y;
                let aabb = Aabb::new(
                    Point3::new(ul.position[0], min_y, lr.position[2]),
                    Point3::new(lr.position[0], max_y, ul.position[2]),
                );
                Patch {
                    row: id as u32 / layout.patch_cols(),
                    col: id as u32 % layout.patch_cols(),
                    aabb,
                    origin: [ul.position[0], ul.position[2]],
                    size: [lr.position[0] - ul.position[0], ul.position[2] - lr.position[2]],
                    uv_origin: ul.tex,
                    uv_size: [lr.tex[0] - ul.tex[0], lr.tex[1] - ul.tex[1]],
                }
            })
            .collect();
        Self { layout, patches }
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Level of every patch, from the eye's distance to the patch centre.
    pub fn levels(&self, eye: Point3<f32>, lod: &LodSettings) -> Vec<u32> {
        self.patches
            .iter()
            .map(|patch| lod.level(eye.distance(patch.aabb.center())))
            .collect()
    }

    /// Levels of the top, right, bottom and left edge of a patch. A shared
    /// edge takes the coarser of both levels, a border edge the patch's own.
    pub fn edge_levels(&self, levels: &[u32], row: u32, col: u32) -> [u32; 4] {
        let own = levels[self.layout.patch_id(row, col)];
        let at = |r: Option<u32>, c: Option<u32>| match (r, c) {
            (Some(r), Some(c)) if r < self.layout.patch_rows() && c < self.layout.patch_cols() => {
                own.min(levels[self.layout.patch_id(r, c)])
            }
            _ => own,
        };
        [
            at(row.checked_sub(1), Some(col)),
            at(Some(row), Some(col + 1)),
            at(Some(row + 1), Some(col)),
            at(Some(row), col.checked_sub(1)),
        ]
    }

    /// Instances for every patch that survives the frustum test, grouped by
    /// level. Levels are picked for all patches first so culled neighbours
    /// still take part in stitching.
    pub fn visible_instances(&self, eye: Point3<f32>, lod: &LodSettings, frustum: Option<&Frustum>) -> LodBatches {
        let levels = self.levels(eye, lod);
        let mut batches: LodBatches = vec![Vec::new(); MAX_LEVEL as usize + 1];
        for (patch, &level) in self.patches.iter().zip(&levels) {
            if frustum.is_some_and(|f| !f.intersects_aabb(&patch.aabb)) {
                continue;
            }
            batches[level as usize].push(PatchInstance {
                origin: patch.origin,
                size: patch.size,
                uv_origin: patch.uv_origin,
                uv_size: patch.uv_size,
                level,
                edges: self.edge_levels(&levels, patch.row, patch.col),
            });
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    fn flat(w: u32, h: u32) -> Heightmap {
        Heightmap::from_heights(vec![1.0; (w * h) as usize], w, h).unwrap()
    }

    #[test]
    fn dimensions_must_fit_whole_patches() {
        assert!(PatchSet::new(&flat(100, 65)).is_err());
        assert!(PatchSet::new(&flat(65, 129)).is_ok());
    }

    #[test]
    fn layout_counts() {
        let layout = PatchLayout::new(&flat(257, 129)).unwrap();
        assert_eq!(layout.vert_cols, 5);
        assert_eq!(layout.vert_rows, 3);
        assert_eq!(layout.patch_count(), 8);
        assert_eq!(layout.build_patch_indices().len(), 32);
        assert_eq!(layout.patch_id(1, 2), 6);
    }

    #[test]
    fn patches_tile_the_terrain() {
        let map = flat(129, 129).with_cell_spacing(0.5);
        let set = PatchSet::new(&map).unwrap();
        assert_eq!(set.patches().len(), 4);

        let first = set.patches()[0];
        assert_eq!(first.origin, [-32.0, 32.0]);
        assert_eq!(first.size, [32.0, 32.0]);
        assert_eq!(first.uv_origin, [0.0, 0.0]);
        assert_eq!(first.uv_size, [0.5, 0.5]);
        assert_eq!(first.aabb.min, Point3::new(-32.0, 1.0, 0.0));
        assert_eq!(first.aabb.max, Point3::new(0.0, 1.0, 32.0));

        let last = set.patches()[3];
        assert_eq!((last.row, last.col), (1, 1));
        assert_eq!(last.origin, [0.0, 0.0]);
    }

    #[test]
    fn lod_ramp() {
        let lod = LodSettings::default();
        assert_eq!(lod.level(0.0), 6);
        assert_eq!(lod.level(20.0), 6);
        assert_eq!(lod.level(260.0), 3);
        assert_eq!(lod.level(500.0), 0);
        assert_eq!(lod.level(10_000.0), 0);

        let clamped = LodSettings {
            max_tess: 9,
            ..LodSettings::default()
        };
        assert_eq!(clamped.level(0.0), MAX_LEVEL);
    }

    #[test]
    fn shared_edges_take_the_coarser_level() {
        let set = PatchSet::new(&flat(193, 65)).unwrap();
        // one row of three patches
        let levels = vec![6, 3, 5];
        assert_eq!(set.edge_levels(&levels, 0, 0), [6, 3, 6, 6]);
        assert_eq!(set.edge_levels(&levels, 0, 1), [3, 3, 3, 3]);
        assert_eq!(set.edge_levels(&levels, 0, 2), [5, 5, 5, 3]);
    }

    #[test]
    fn instances_are_grouped_and_culled() {
        let set = PatchSet::new(&flat(129, 129)).unwrap();
        let lod = LodSettings::default();

        let all = set.visible_instances(Point3::new(0.0, 2.0, 0.0), &lod, None);
        assert_eq!(all.len(), MAX_LEVEL as usize + 1);
        assert_eq!(all.iter().map(Vec::len).sum::<usize>(), 4);
        // all centres are ~45 units away, which still rounds to the finest level
        assert_eq!(all[6].len(), 4);

        // looking away from the +z half culls the two far patches
        let mut camera = Camera::default();
        camera.look_at(Point3::new(0.0, 2.0, -1.0), Point3::new(0.0, 2.0, -10.0), [0.0, 1.0, 0.0].into());
        let frustum = Frustum::from_view_proj(&camera.view_proj());
        let visible = set.visible_instances(camera.position(), &lod, Some(&frustum));
        let rows: Vec<_> = visible.iter().flatten().map(|p| p.origin[1]).collect();
        assert_eq!(rows, vec![0.0, 0.0]);
    }

    #[test]
    fn unit_grid_matches_level() {
        let grid = unit_grid(2);
        assert_eq!(grid.vertices.len(), 25);
        assert_eq!(grid.indices.len(), 4 * 4 * 6);
        assert_eq!(grid.vertices[24].local, [1.0, 1.0]);
        assert_eq!(unit_grid(0).indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(std::mem::size_of::<PatchInstance>(), 52);
    }
}
