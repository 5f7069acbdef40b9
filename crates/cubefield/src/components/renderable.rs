use crate::math::{Vec3, Vec4};

/// Which primitive the renderer should draw for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MeshKind {
    #[default]
    Cube,
    Sphere,
    Plane,
    Custom,
}

/// Visual description of an entity. Only visible renderables reach the
/// renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub mesh: MeshKind,
    /// Linear RGB, each channel in `0.0..=1.0`.
    pub color: Vec3,
    pub visible: bool,
    pub opacity: f32,
}

impl Renderable {
    /// A visible, opaque cube of the given color.
    pub fn cube(color: Vec3) -> Self {
        Self {
            mesh: MeshKind::Cube,
            color,
            visible: true,
            opacity: 1.0,
        }
    }

    pub fn with_mesh(mut self, mesh: MeshKind) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Color with opacity in the alpha channel.
    pub fn rgba(&self) -> Vec4 {
        self.color.extend(self.opacity)
    }
}

impl Default for Renderable {
    fn default() -> Self {
        Self::cube(Vec3::ONE)
    }
}
