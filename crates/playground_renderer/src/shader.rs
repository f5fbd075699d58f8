//! Shader programs: a vertex and a fragment WGSL module loaded from disk.
//!
//! Every playground shader declares the same uniform block at
//! `@group(0) @binding(0)`:
//!
//! ```wgsl
//! struct DrawUniforms {
//!     mvp: mat4x4<f32>,
//!     model: mat4x4<f32>,
//!     view: mat4x4<f32>,
//!     light_position: vec4<f32>,
//! };
//! ```
//!
//! so a uniform "location" is the byte offset of a member inside that block.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use playground_core::ShaderPaths;
use thiserror::Error;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("cannot read shader `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader `{}` failed to compile: {message}", .path.display())]
    Compile { path: PathBuf, message: String },
}

/// Uniform block members, by WGSL name and by the names the GLSL tutorial
/// programs use.
const UNIFORMS: [(&str, &str, u32); 4] = [
    ("mvp", "MVP", 0),
    ("model", "M", 64),
    ("view", "V", 128),
    ("light_position", "LightPosition_worldspace", 192),
];

pub struct ShaderProgram {
    pub vertex: Arc<wgpu::ShaderModule>,
    pub fragment: Arc<wgpu::ShaderModule>,
    paths: ShaderPaths,
    sources: Vec<String>,
}

impl ShaderProgram {
    /// Reads and compiles both stages.  When both paths name the same file
    /// it is compiled once and used for both entry points.
    pub fn load(device: &wgpu::Device, paths: &ShaderPaths) -> Result<Self, ShaderError> {
        let vertex_src = read_source(&paths.vertex)?;
        let vertex = Arc::new(compile(device, &paths.vertex, &vertex_src)?);

        let (fragment, sources) = if paths.fragment == paths.vertex {
            (Arc::clone(&vertex), vec![vertex_src])
        } else {
            let fragment_src = read_source(&paths.fragment)?;
            let fragment = Arc::new(compile(device, &paths.fragment, &fragment_src)?);
            (fragment, vec![vertex_src, fragment_src])
        };

        log::info!(
            "loaded shader program {} + {}",
            paths.vertex.display(),
            paths.fragment.display()
        );
        Ok(Self {
            vertex,
            fragment,
            paths: paths.clone(),
            sources,
        })
    }

    pub fn paths(&self) -> &ShaderPaths {
        &self.paths
    }

    /// Byte offset of `name` in the uniform block, or `None` when the name
    /// is not a block member or neither stage references it.
    pub fn uniform_location(&self, name: &str) -> Option<u32> {
        let (member, offset) = uniform_member(name)?;
        self.sources
            .iter()
            .any(|src| references_identifier(src, member))
            .then_some(offset)
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn compile(device: &wgpu::Device, path: &Path, source: &str) -> Result<wgpu::ShaderModule, ShaderError> {
    let label = path.display().to_string();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(module),
        Some(err) => Err(ShaderError::Compile {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

/// Resolves either spelling of a uniform to `(wgsl_member, offset)`.
pub fn uniform_member(name: &str) -> Option<(&'static str, u32)> {
    UNIFORMS
        .iter()
        .find(|(wgsl, glsl, _)| name == *wgsl || name == *glsl)
        .map(|(wgsl, _, offset)| (*wgsl, *offset))
}

/// True when `ident` occurs in `source` as a whole identifier.
fn references_identifier(source: &str, ident: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    source.match_indices(ident).any(|(at, _)| {
        let before = source[..at].chars().next_back();
        let after = source[at + ident.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_spellings_resolve_to_the_same_offset() {
        assert_eq!(uniform_member("MVP"), Some(("mvp", 0)));
        assert_eq!(uniform_member("mvp"), Some(("mvp", 0)));
        assert_eq!(uniform_member("M"), Some(("model", 64)));
        assert_eq!(uniform_member("V"), Some(("view", 128)));
        assert_eq!(
            uniform_member("LightPosition_worldspace"),
            Some(("light_position", 192))
        );
        assert_eq!(uniform_member("projection"), None);
    }

    #[test]
    fn identifier_match_respects_word_boundaries() {
        let src = "let p = u.mvp * vec4(pos, 1.0); let mv = u.view_model;";
        assert!(references_identifier(src, "mvp"));
        assert!(!references_identifier(src, "view"));
        assert!(!references_identifier(src, "model"));
        assert!(references_identifier("model", "model"));
    }

    #[test]
    fn bundled_shaders_define_both_entry_points() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/shaders");
        for name in playground_core::Scenario::BUILTIN {
            let vertex = read_source(&root.join(name).join("vertex.wgsl")).unwrap();
            let fragment = read_source(&root.join(name).join("fragment.wgsl")).unwrap();
            assert!(vertex.contains("fn vs_main"), "{name}");
            assert!(fragment.contains("fn fs_main"), "{name}");
        }

        let lit = read_source(&root.join("lit-cube/vertex.wgsl")).unwrap();
        for name in ["MVP", "M", "V", "LightPosition_worldspace"] {
            let (member, _) = uniform_member(name).unwrap();
            assert!(references_identifier(&lit, member), "{name}");
        }
        let triangle = read_source(&root.join("triangle/vertex.wgsl")).unwrap();
        assert!(!references_identifier(&triangle, "mvp"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_source(Path::new("assets/shaders/does-not-exist.wgsl")).unwrap_err();
        assert!(matches!(err, ShaderError::Read { .. }));
        assert!(err.to_string().contains("does-not-exist.wgsl"));
    }
}
