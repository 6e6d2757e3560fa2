//! CPU copy of the terrain heights.

use anyhow::ensure;

use super::CELLS_PER_PATCH;

/// Row-major grid of heights. Row 0 is the far (+z) edge of the terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    samples_wide: u32,
    samples_deep: u32,
    cell_spacing: f32,
    heights: Vec<f32>,
}

impl Heightmap {
    pub fn from_heights(heights: Vec<f32>, samples_wide: u32, samples_deep: u32) -> anyhow::Result<Self> {
        ensure!(
            samples_wide >= 2 && samples_deep >= 2,
            "heightmap needs at least 2x2 samples, got {samples_wide}x{samples_deep}"
        );
        ensure!(
            heights.len() == samples_wide as usize * samples_deep as usize,
            "heightmap has {} samples, expected {samples_wide}x{samples_deep}",
            heights.len()
        );
        Ok(Self {
            samples_wide,
            samples_deep,
            cell_spacing: 1.0,
            heights,
        })
    }

    /// One byte per sample, scaled to `0..=height_scale`.
    pub fn from_raw_u8(bytes: &[u8], samples_wide: u32, samples_deep: u32, height_scale: f32) -> anyhow::Result<Self> {
        let heights = bytes
            .iter()
            .map(|&b| b as f32 / 255.0 * height_scale)
            .collect();
        Self::from_heights(heights, samples_wide, samples_deep)
    }

    /// Little endian 16 bit samples, scaled to `0..=height_scale`.
    pub fn from_raw_u16_le(bytes: &[u8], samples_wide: u32, samples_deep: u32, height_scale: f32) -> anyhow::Result<Self> {
        ensure!(bytes.len() % 2 == 0, "16 bit heightmap has an odd byte count ({})", bytes.len());
        let heights = bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]) as f32 / u16::MAX as f32 * height_scale)
            .collect();
        Self::from_heights(heights, samples_wide, samples_deep)
    }

    pub fn with_cell_spacing(mut self, cell_spacing: f32) -> Self {
        self.cell_spacing = cell_spacing;
        self
    }

    pub fn samples_wide(&self) -> u32 {
        self.samples_wide
    }

    pub fn samples_deep(&self) -> u32 {
        self.samples_deep
    }

    pub fn cell_spacing(&self) -> f32 {
        self.cell_spacing
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn sample(&self, row: u32, col: u32) -> f32 {
        self.heights[(row * self.samples_wide + col) as usize]
    }

    /// Extent along x in world units.
    pub fn width(&self) -> f32 {
        (self.samples_wide - 1) as f32 * self.cell_spacing
    }

    /// Extent along z in world units.
    pub fn depth(&self) -> f32 {
        (self.samples_deep - 1) as f32 * self.cell_spacing
    }

    /// Replaces every sample by the average of its in-bounds 3x3 neighbourhood.
    /// Reads from a copy so already smoothed samples do not feed back.
    pub fn smooth(&mut self) {
        let source = self.heights.clone();
        let (w, h) = (self.samples_wide as i64, self.samples_deep as i64);
        for row in 0..h {
            for col in 0..w {
                let mut sum = 0.0;
                let mut count = 0.0;
                for r in row - 1..=row + 1 {
                    for c in col - 1..=col + 1 {
                        if r >= 0 && r < h && c >= 0 && c < w {
                            sum += source[(r * w + c) as usize];
                            count += 1.0;
                        }
                    }
                }
                self.heights[(row * w + col) as usize] = sum / count;
            }
        }
    }

    /// Height of the surface at world `(x, z)`, interpolated on the triangle of
    /// the cell the point falls in. Points outside the terrain read as 0.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let c = (x + 0.5 * self.width()) / self.cell_spacing;
        let d = (z - 0.5 * self.depth()) / -self.cell_spacing;
        let last_col = (self.samples_wide - 1) as f32;
        let last_row = (self.samples_deep - 1) as f32;
        if !(0.0..=last_col).contains(&c) || !(0.0..=last_row).contains(&d) {
            return 0.0;
        }

        let col = (c.floor() as u32).min(self.samples_wide - 2);
        let row = (d.floor() as u32).min(self.samples_deep - 2);

        //  A*--*B
        //   | /|
        //   |/ |
        //  C*--*D
        let a = self.sample(row, col);
        let b = self.sample(row, col + 1);
        let cc = self.sample(row + 1, col);
        let dd = self.sample(row + 1, col + 1);

        let s = c - col as f32;
        let t = d - row as f32;
        if s + t <= 1.0 {
            a + s * (b - a) + t * (cc - a)
        } else {
            dd + (1.0 - s) * (cc - dd) + (1.0 - t) * (b - dd)
        }
    }

    /// Lowest and highest sample of patch `(i, j)`, including the samples it
    /// shares with its neighbours.
    pub fn patch_bounds_y(&self, i: u32, j: u32) -> (f32, f32) {
        let row0 = i * CELLS_PER_PATCH;
        let col0 = j * CELLS_PER_PATCH;
        let row1 = (row0 + CELLS_PER_PATCH).min(self.samples_deep - 1);
        let col1 = (col0 + CELLS_PER_PATCH).min(self.samples_wide - 1);

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for row in row0..=row1 {
            for col in col0..=col1 {
                let h = self.sample(row, col);
                min = min.min(h);
                max = max.max(h);
            }
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> Heightmap {
        // height grows along x
        let heights = (0..h).flat_map(|_| (0..w).map(|c| c as f32)).collect();
        Heightmap::from_heights(heights, w, h).unwrap()
    }

    #[test]
    fn raw_bytes_are_scaled() {
        let map = Heightmap::from_raw_u8(&[0, 255, 51, 102], 2, 2, 10.0).unwrap();
        assert_eq!(map.heights(), &[0.0, 10.0, 2.0, 4.0]);

        let map = Heightmap::from_raw_u16_le(&[0, 0, 255, 255, 0, 0, 255, 255], 2, 2, 1.0).unwrap();
        assert_eq!(map.sample(0, 1), 1.0);
    }

    #[test]
    fn size_mismatch_is_an_error() {
        assert!(Heightmap::from_raw_u8(&[0; 5], 2, 2, 1.0).is_err());
        assert!(Heightmap::from_raw_u16_le(&[0; 7], 2, 2, 1.0).is_err());
    }

    #[test]
    fn smoothing_averages_in_bounds_neighbours() {
        let mut map = Heightmap::from_heights(vec![0.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0], 3, 3).unwrap();
        map.smooth();
        assert_eq!(map.sample(1, 1), 1.0);
        // corner sees 4 samples
        assert_eq!(map.sample(0, 0), 9.0 / 4.0);
        // edge sees 6 samples
        assert_eq!(map.sample(0, 1), 9.0 / 6.0);
    }

    #[test]
    fn extents_follow_spacing() {
        let map = ramp(5, 3).with_cell_spacing(2.0);
        assert_eq!(map.width(), 8.0);
        assert_eq!(map.depth(), 4.0);
    }

    #[test]
    fn height_at_interpolates_and_clamps() {
        let map = ramp(5, 5);
        // x = -2 is column 0, x = 2 is column 4
        assert!((map.height_at(-2.0, 0.0) - 0.0).abs() < 1e-5);
        assert!((map.height_at(0.5, 0.3) - 2.5).abs() < 1e-5);
        assert!((map.height_at(2.0, -2.0) - 4.0).abs() < 1e-5);
        assert_eq!(map.height_at(10.0, 0.0), 0.0);
        assert_eq!(map.height_at(0.0, -3.0), 0.0);
    }

    #[test]
    fn height_at_uses_both_triangles() {
        // single cell, A=0 B=1 C=2 D=9
        let map = Heightmap::from_heights(vec![0.0, 1.0, 2.0, 9.0], 2, 2).unwrap();
        // upper triangle, close to A
        assert!((map.height_at(-0.4, 0.4) - 0.1 - 0.2).abs() < 1e-5);
        // lower triangle, exactly at D
        assert!((map.height_at(0.5, -0.5) - 9.0).abs() < 1e-5);
    }

    #[test]
    fn patch_bounds_cover_shared_samples() {
        let map = ramp(129, 65);
        assert_eq!(map.patch_bounds_y(0, 0), (0.0, 64.0));
        assert_eq!(map.patch_bounds_y(0, 1), (64.0, 128.0));
    }
}
