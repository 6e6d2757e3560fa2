//! Technique selection and the fixed-function states the pipelines are built from.

use winit::keyboard::KeyCode;

/// What the lit shaders do with textures and fog for the whole frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RenderOptions {
    Lighting,
    Textures,
    #[default]
    TexturesAndFog,
}

impl RenderOptions {
    pub fn textures(self) -> bool {
        !matches!(self, RenderOptions::Lighting)
    }

    pub fn fog(self) -> bool {
        matches!(self, RenderOptions::TexturesAndFog)
    }

    /// Number keys 1, 2 and 3 switch techniques.
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Digit1 | KeyCode::Numpad1 => Some(RenderOptions::Lighting),
            KeyCode::Digit2 | KeyCode::Numpad2 => Some(RenderOptions::Textures),
            KeyCode::Digit3 | KeyCode::Numpad3 => Some(RenderOptions::TexturesAndFog),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum RasterState {
    #[default]
    Solid,
    Wireframe,
    NoCull,
}

impl RasterState {
    /// Triangles are wound clockwise when seen from the front.
    pub fn primitive(self, topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
        let (polygon_mode, cull_mode) = match self {
            RasterState::Solid => (wgpu::PolygonMode::Fill, Some(wgpu::Face::Back)),
            RasterState::Wireframe => (wgpu::PolygonMode::Line, None),
            RasterState::NoCull => (wgpu::PolygonMode::Fill, None),
        };
        let is_lines = matches!(
            topology,
            wgpu::PrimitiveTopology::LineList | wgpu::PrimitiveTopology::LineStrip
        );
        wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Cw,
            cull_mode: if is_lines { None } else { cull_mode },
            polygon_mode: if is_lines {
                wgpu::PolygonMode::Fill
            } else {
                polygon_mode
            },
            unclipped_depth: false,
            conservative: false,
        }
    }

    /// Wireframe needs an optional device feature, everything else is always
    /// available.
    pub fn supported_by(self, features: wgpu::Features) -> bool {
        match self {
            RasterState::Wireframe => features.contains(wgpu::Features::POLYGON_MODE_LINE),
            _ => true,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Cut-out foliage and fences. With a single sample per pixel this
    /// degrades to alpha clipping in the fragment shader.
    AlphaToCoverage,
    Transparent,
}

impl BlendMode {
    pub fn blend_state(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Opaque | BlendMode::AlphaToCoverage => Some(wgpu::BlendState::REPLACE),
            BlendMode::Transparent => Some(wgpu::BlendState::ALPHA_BLENDING),
        }
    }

    pub fn multisample(self, sample_count: u32) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: self == BlendMode::AlphaToCoverage && sample_count > 1,
        }
    }

    /// Whether the shader has to discard low-alpha fragments itself.
    pub fn needs_alpha_clip(self, sample_count: u32) -> bool {
        self == BlendMode::AlphaToCoverage && sample_count <= 1
    }

    /// Blended geometry is depth tested but does not occlude what is drawn after it.
    pub fn writes_depth(self) -> bool {
        self != BlendMode::Transparent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_to_technique_flags() {
        assert!(!RenderOptions::Lighting.textures());
        assert!(!RenderOptions::Lighting.fog());
        assert!(RenderOptions::Textures.textures());
        assert!(!RenderOptions::Textures.fog());
        assert!(RenderOptions::TexturesAndFog.textures());
        assert!(RenderOptions::TexturesAndFog.fog());
    }

    #[test]
    fn number_keys_select_options() {
        assert_eq!(RenderOptions::from_key(KeyCode::Digit1), Some(RenderOptions::Lighting));
        assert_eq!(RenderOptions::from_key(KeyCode::Numpad3), Some(RenderOptions::TexturesAndFog));
        assert_eq!(RenderOptions::from_key(KeyCode::KeyW), None);
    }

    #[test]
    fn lines_never_cull_or_use_line_polygon_mode() {
        let state = RasterState::Wireframe.primitive(wgpu::PrimitiveTopology::LineList);
        assert_eq!(state.cull_mode, None);
        assert_eq!(state.polygon_mode, wgpu::PolygonMode::Fill);

        let state = RasterState::Solid.primitive(wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(state.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(state.front_face, wgpu::FrontFace::Cw);
    }

    #[test]
    fn wireframe_requires_feature() {
        assert!(!RasterState::Wireframe.supported_by(wgpu::Features::empty()));
        assert!(RasterState::Wireframe.supported_by(wgpu::Features::POLYGON_MODE_LINE));
        assert!(RasterState::NoCull.supported_by(wgpu::Features::empty()));
    }

    #[test]
    fn alpha_to_coverage_falls_back_to_clipping() {
        assert!(!BlendMode::AlphaToCoverage.multisample(1).alpha_to_coverage_enabled);
        assert!(BlendMode::AlphaToCoverage.needs_alpha_clip(1));
        assert!(BlendMode::AlphaToCoverage.multisample(4).alpha_to_coverage_enabled);
        assert!(!BlendMode::Transparent.writes_depth());
    }
}
