//! Scenario records: everything that used to differ between the tutorial
//! steps (meshes, shader pair, primitive kind, per-body model update) in one
//! value, so a single [`FrameLoop`](crate::FrameLoop) can run any of them.

use std::path::PathBuf;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::error::ScenarioError;
use crate::mesh::Mesh;
use crate::transform::{compute_model, Camera, Spin};

/// Primitive assembly for a draw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Triangles,
    TriangleStrip,
    Lines,
    LineStrip,
    Points,
}

/// Vertex and fragment WGSL sources, resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// `assets/shaders/<dir>/vertex.wgsl` + `fragment.wgsl`.
    pub fn bundled(dir: &str) -> Self {
        let base = PathBuf::from("assets/shaders").join(dir);
        Self::new(base.join("vertex.wgsl"), base.join("fragment.wgsl"))
    }
}

/// How a body's model matrix follows the clock.
#[derive(Debug, Clone, Copy)]
pub enum Motion {
    Fixed(Mat4),
    Spin(Spin),
    /// Arbitrary model update; receives the clock angle in radians.
    Custom(fn(f32) -> Mat4),
}

impl Motion {
    pub fn model(&self, angle: f32) -> Mat4 {
        match self {
            Motion::Fixed(m) => *m,
            Motion::Spin(spin) => compute_model(angle, *spin),
            Motion::Custom(f) => f(angle),
        }
    }
}

/// Function addresses are not stable across codegen units, so two
/// `Custom` motions never compare equal.
impl PartialEq for Motion {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Motion::Fixed(a), Motion::Fixed(b)) => a == b,
            (Motion::Spin(a), Motion::Spin(b)) => a == b,
            _ => false,
        }
    }
}

/// One draw per frame: a vertex range of a mesh under its own model matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub mesh: usize,
    pub first_vertex: u32,
    /// `None` draws to the end of the mesh.
    pub vertex_count: Option<u32>,
    pub motion: Motion,
}

impl Body {
    /// Whole of mesh `mesh`.
    pub fn whole(mesh: usize, motion: Motion) -> Self {
        Self {
            mesh,
            first_vertex: 0,
            vertex_count: None,
            motion,
        }
    }

    /// `count` vertices starting at `first`.
    pub fn range(mesh: usize, first: u32, count: u32, motion: Motion) -> Self {
        Self {
            mesh,
            first_vertex: first,
            vertex_count: Some(count),
            motion,
        }
    }

    /// Vertex count once the mesh size is known.
    pub fn resolved_count(&self, mesh_vertices: u32) -> u32 {
        self.vertex_count
            .unwrap_or_else(|| mesh_vertices.saturating_sub(self.first_vertex))
    }
}

/// A complete per-run configuration for the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub shader: ShaderPaths,
    pub draw_mode: PrimitiveKind,
    pub bodies: Vec<Body>,
    pub depth_test: bool,
    pub clear_color: Color,
    pub camera: Camera,
    /// World-space light position, for shaders that shade.
    pub light_position: Vec3,
}

impl Scenario {
    /// Names accepted by [`Scenario::builtin`].
    pub const BUILTIN: [&'static str; 4] = ["triangle", "outline", "twin-spin", "lit-cube"];

    /// Looks up a bundled scenario by name.
    pub fn builtin(name: &str) -> Result<Self, ScenarioError> {
        let scenario = match name {
            "triangle" => triangle()?,
            "outline" => outline()?,
            "twin-spin" => twin_spin()?,
            "lit-cube" => lit_cube()?,
            other => return Err(ScenarioError::Unknown(other.to_string())),
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks the cross-references a mesh cannot check on its own.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let Some(first) = self.meshes.first() else {
            return Err(ScenarioError::NoMeshes(self.name.clone()));
        };
        if self.bodies.is_empty() {
            return Err(ScenarioError::NoBodies(self.name.clone()));
        }

        let streams = first.streams();
        if let Some(i) = self.meshes.iter().position(|m| m.streams() != streams) {
            return Err(ScenarioError::MixedStreams(i));
        }

        for (i, body) in self.bodies.iter().enumerate() {
            let mesh = self
                .meshes
                .get(body.mesh)
                .ok_or(ScenarioError::MissingMesh {
                    body: i,
                    mesh: body.mesh,
                    available: self.meshes.len(),
                })?;
            let vertex_count = mesh.vertex_count();
            let end = body
                .first_vertex
                .saturating_add(body.resolved_count(vertex_count));
            if body.first_vertex >= vertex_count || end > vertex_count {
                return Err(ScenarioError::RangeOutOfBounds {
                    body: i,
                    first: body.first_vertex,
                    end,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    fn base(name: &str, meshes: Vec<Mesh>, draw_mode: PrimitiveKind, bodies: Vec<Body>) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            shader: ShaderPaths::bundled(name),
            draw_mode,
            bodies,
            depth_test: false,
            clear_color: Color::DARK_BLUE,
            camera: Camera::default(),
            light_position: Vec3::new(4.0, 4.0, 1.0),
        }
    }
}

// ── Bundled scenarios ───────────────────────────────────────────────────────

fn triangle() -> Result<Scenario, ScenarioError> {
    #[rustfmt::skip]
    const POSITIONS: [f32; 9] = [
        -1.0, -1.0, 0.0,
         1.0, -1.0, 0.0,
         0.0,  1.0, 0.0,
    ];
    let mesh = Mesh::from_flat(&POSITIONS)?;
    Ok(Scenario::base(
        "triangle",
        vec![mesh],
        PrimitiveKind::Triangles,
        vec![Body::whole(0, Motion::Fixed(Mat4::IDENTITY))],
    ))
}

fn outline() -> Result<Scenario, ScenarioError> {
    // Seven segments: the walls, the roof and a cross beam.
    #[rustfmt::skip]
    const POSITIONS: [f32; 42] = [
        -1.0, -1.0, 0.0,   -1.0,  1.0, 0.0,
        -1.0, -1.0, 0.0,    1.0, -1.0, 0.0,
         1.0, -1.0, 0.0,    1.0,  1.0, 0.0,
        -1.0,  1.0, 0.0,    0.0,  1.5, 0.0,
         1.0,  1.0, 0.0,    0.0,  1.5, 0.0,
         1.0,  1.0, 0.0,    1.0,  0.0, 0.0,
        -1.0,  1.0, 0.0,    1.0,  1.0, 0.0,
    ];
    let mesh = Mesh::from_flat(&POSITIONS)?.with_uniform_color(Color::WHITE.to_rgb_array())?;
    Ok(Scenario::base(
        "outline",
        vec![mesh],
        PrimitiveKind::Lines,
        vec![Body::whole(0, Motion::Fixed(Mat4::IDENTITY))],
    ))
}

fn twin_spin() -> Result<Scenario, ScenarioError> {
    #[rustfmt::skip]
    const POSITIONS: [f32; 36] = [
        -1.0, -1.0, 0.0,   -1.0,  1.0, 0.0,    1.0,  1.0, 0.0,
         1.0,  1.0, 0.0,    1.0, -1.0, 0.0,   -1.0, -1.0, 0.0,
        -1.0,  1.0, 0.0,    0.0,  1.5, 0.0,    1.0,  1.0, 0.0,
        -1.0, -1.0, 0.2,    0.0,  1.0, 0.2,    1.0, -1.0, 0.2,
    ];
    let colors = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE]
        .into_iter()
        .flat_map(|c| [c.to_rgb_array(); 3])
        .collect();
    let mesh = Mesh::from_flat(&POSITIONS)?.with_colors(colors)?;
    // Both bodies share the first three triangles and spin in opposite
    // directions; the fourth triangle is uploaded but never drawn.
    Ok(Scenario::base(
        "twin-spin",
        vec![mesh],
        PrimitiveKind::Triangles,
        vec![
            Body::range(0, 0, 9, Motion::Spin(Spin::Forward)),
            Body::range(0, 0, 9, Motion::Spin(Spin::Reverse)),
        ],
    ))
}

fn lit_cube() -> Result<Scenario, ScenarioError> {
    // A 2x2x2 box spanning z in [-1.8, 0.2]; the tutorial feeds the
    // positions back in as normals.
    #[rustfmt::skip]
    const POSITIONS: [f32; 108] = [
        -1.0,  1.0,  0.2,    1.0,  1.0,  0.2,   -1.0, -1.0,  0.2,
         1.0,  1.0,  0.2,    1.0, -1.0,  0.2,   -1.0, -1.0,  0.2,
        -1.0,  1.0, -1.8,    1.0,  1.0, -1.8,   -1.0, -1.0, -1.8,
         1.0,  1.0, -1.8,    1.0, -1.0, -1.8,   -1.0, -1.0, -1.8,
        -1.0,  1.0, -1.8,   -1.0, -1.0,  0.2,   -1.0, -1.0, -1.8,
        -1.0,  1.0, -1.8,   -1.0,  1.0,  0.2,   -1.0, -1.0,  0.2,
         1.0,  1.0,  0.2,    1.0,  1.0, -1.8,    1.0, -1.0,  0.2,
         1.0,  1.0, -1.8,    1.0, -1.0, -1.8,    1.0, -1.0,  0.2,
        -1.0,  1.0,  0.2,   -1.0,  1.0, -1.8,    1.0,  1.0, -1.8,
        -1.0,  1.0,  0.2,    1.0,  1.0, -1.8,    1.0,  1.0,  0.2,
        -1.0, -1.0,  0.2,    1.0, -1.0,  0.2,    1.0, -1.0, -1.8,
        -1.0, -1.0,  0.2,    1.0, -1.0, -1.8,   -1.0, -1.0, -1.8,
    ];
    // Green everywhere except the last triangle, which is red.
    let mut colors = vec![Color::GREEN.to_rgb_array(); 36];
    colors[33..].fill(Color::RED.to_rgb_array());

    let mesh = Mesh::from_flat(&POSITIONS)?
        .with_colors(colors)?
        .with_flat_normals(&POSITIONS)?;
    let mut scenario = Scenario::base(
        "lit-cube",
        vec![mesh],
        PrimitiveKind::Triangles,
        vec![Body::whole(0, Motion::Spin(Spin::Forward))],
    );
    scenario.depth_test = true;
    Ok(scenario)
}
