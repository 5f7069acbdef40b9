//! # Render Boundary: What the Simulation Hands to a Renderer
//!
//! The simulation never talks to a GPU. Each frame the `RenderSystem`
//! flattens every visible entity into an [`InstanceData`] record; the
//! application then passes those records, together with a [`CameraView`], to
//! whatever implements [`Renderer`]. An OpenGL or wgpu backend uploads the
//! slice straight into an instance buffer and draws one unit cube per record.
//!
//! ```text
//!  World ──RenderSystem──► [InstanceData] ──► Renderer::draw_cubes(camera, instances)
//!                           (cached, Pod)           │
//!                                                   └─► one instanced draw call
//! ```
//!
//! ## Memory Layout
//!
//! `InstanceData` is `#[repr(C)]` and `bytemuck::Pod`, so `&[InstanceData]`
//! casts to `&[u8]` without copying.
//!
//! ```text
//! InstanceData (80 bytes per instance)
//! ┌──────────────────────────────────┬────────────────────┐
//! │ model                            │ color              │
//! │ [[f32; 4]; 4] column-major       │ [f32; 4] RGBA      │
//! │ 64 bytes, offset 0               │ 16 bytes, offset 64│
//! └──────────────────────────────────┴────────────────────┘
//! ```
//!
//! A shader reading the model matrix as four `vec4` attributes consumes the
//! columns in order, which is exactly what `Mat4::to_cols_array_2d` produces.
//!
//! ## Comparison
//!
//! - **Bevy**: extracts render-world copies of components every frame, then
//!   batches by material and mesh.
//! - **Ours**: one mesh, one material, one flat array. A renderer that wants
//!   spheres or planes can read [`MeshKind`](crate::components::MeshKind)
//!   before flattening, but the demo draws everything as a cube.

use bytemuck::{Pod, Zeroable};

use crate::math::{Mat4, Vec3, Vec4};

/// Per-instance data for one drawn cube.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceData {
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// World-space translation encoded in the model matrix.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}

/// View and projection for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub eye: Vec3,
    pub target: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraView {
    pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 200.0;

    /// Right-handed perspective camera at `eye` looking at `target`, Y up.
    pub fn look_at(eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self::perspective(eye, target, Self::FOV_Y, aspect)
    }

    /// Like [`look_at`](Self::look_at) with an explicit vertical field of
    /// view in radians.
    pub fn perspective(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        Self {
            eye,
            target,
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y, aspect, Self::NEAR, Self::FAR),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for CameraView {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, 16.0 / 9.0)
    }
}

/// The drawing backend. Implemented by the windowed application; tests and
/// the headless example implement it with a recorder.
pub trait Renderer {
    fn draw_cubes(&mut self, camera: &CameraView, instances: &[InstanceData]);
}

/// Position and normal of one cube corner.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Unit cube centered at the origin: 24 vertices (each face owns its four
/// corners so normals stay flat) and 36 counter-clockwise indices.
pub fn cube_mesh() -> (Vec<CubeVertex>, Vec<u32>) {
    // (normal, u, v) with u × v = normal so the winding faces outward.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (cu, cv) in corners {
            let position = (normal + u * cu + v * cv) * 0.5;
            vertices.push(CubeVertex {
                position: position.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;

    #[test]
    fn instance_layout() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 80);
        let data = [InstanceData::new(Mat4::IDENTITY, Vec4::ONE)];
        assert_eq!(bytemuck::cast_slice::<_, u8>(&data).len(), 80);
    }

    #[test]
    fn instance_keeps_translation() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(1.0),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let inst = InstanceData::new(model, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(inst.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(inst.model_matrix(), model);
    }

    #[test]
    fn cube_counts_and_ranges() {
        let (verts, idxs) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(idxs.len(), 36);
        assert!(idxs.iter().all(|&i| (i as usize) < verts.len()));
        for v in &verts {
            assert!(v.position.iter().all(|c| c.abs() <= 0.5 + 1e-6));
        }
    }

    #[test]
    fn cube_triangles_face_outward() {
        let (verts, idxs) = cube_mesh();
        for tri in idxs.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(verts[i as usize].position));
            let n = Vec3::from(verts[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn degenerate_aspect_falls_back() {
        let cam = CameraView::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 0.0);
        assert!(cam.projection.is_finite());
        let p = cam.view_projection().project_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }
}
