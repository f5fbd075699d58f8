//! CPU-side mesh data: one required position stream plus optional colour
//! and normal streams of the same length.
//!
//! Meshes are static for a run in every built-in scenario, but the
//! [`FrameLoop`](crate::FrameLoop) accepts replacements through
//! `update_mesh`, which is why the type owns its data instead of borrowing
//! `'static` slices.

use crate::error::MeshError;

/// A per-vertex data channel.  The discriminant is the shader location the
/// stream is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeStream {
    Position = 0,
    Color = 1,
    Normal = 2,
}

impl AttributeStream {
    pub const ALL: [AttributeStream; 3] = [Self::Position, Self::Color, Self::Normal];

    /// `@location(n)` of the stream in every playground shader.
    #[inline]
    pub fn location(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Color => "color",
            Self::Normal => "normal",
        }
    }
}

/// Which optional streams a mesh carries.  Position is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamSet {
    pub color: bool,
    pub normal: bool,
}

impl StreamSet {
    pub const POSITION_ONLY: Self = Self { color: false, normal: false };

    pub fn contains(self, stream: AttributeStream) -> bool {
        match stream {
            AttributeStream::Position => true,
            AttributeStream::Color => self.color,
            AttributeStream::Normal => self.normal,
        }
    }

    /// Present streams in location order.
    pub fn iter(self) -> impl Iterator<Item = AttributeStream> {
        AttributeStream::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

/// Ordered vertex positions with optional per-vertex colours and normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    colors: Option<Vec<[f32; 3]>>,
    normals: Option<Vec<[f32; 3]>>,
}

impl Mesh {
    /// Position-only mesh.
    pub fn new(positions: Vec<[f32; 3]>) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::Empty);
        }
        Ok(Self {
            positions,
            colors: None,
            normals: None,
        })
    }

    /// Builds a position-only mesh from a flat `x, y, z, x, y, z, ...` array.
    pub fn from_flat(data: &[f32]) -> Result<Self, MeshError> {
        Self::new(chunk_triples(AttributeStream::Position, data)?)
    }

    pub fn with_colors(mut self, colors: Vec<[f32; 3]>) -> Result<Self, MeshError> {
        self.check_len(AttributeStream::Color, colors.len())?;
        self.colors = Some(colors);
        Ok(self)
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Result<Self, MeshError> {
        self.check_len(AttributeStream::Normal, normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    pub fn with_flat_normals(self, data: &[f32]) -> Result<Self, MeshError> {
        let normals = chunk_triples(AttributeStream::Normal, data)?;
        self.with_normals(normals)
    }

    /// Same colour for every vertex.
    pub fn with_uniform_color(self, color: [f32; 3]) -> Result<Self, MeshError> {
        let colors = vec![color; self.positions.len()];
        self.with_colors(colors)
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> Option<&[[f32; 3]]> {
        self.colors.as_deref()
    }

    pub fn normals(&self) -> Option<&[[f32; 3]]> {
        self.normals.as_deref()
    }

    /// Data of one stream, `None` if the mesh does not carry it.
    pub fn stream(&self, stream: AttributeStream) -> Option<&[[f32; 3]]> {
        match stream {
            AttributeStream::Position => Some(&self.positions),
            AttributeStream::Color => self.colors(),
            AttributeStream::Normal => self.normals(),
        }
    }

    pub fn streams(&self) -> StreamSet {
        StreamSet {
            color: self.colors.is_some(),
            normal: self.normals.is_some(),
        }
    }

    fn check_len(&self, stream: AttributeStream, actual: usize) -> Result<(), MeshError> {
        let expected = self.positions.len();
        if actual != expected {
            return Err(MeshError::LengthMismatch {
                stream,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

fn chunk_triples(stream: AttributeStream, data: &[f32]) -> Result<Vec<[f32; 3]>, MeshError> {
    if data.len() % 3 != 0 {
        return Err(MeshError::Ragged {
            stream,
            len: data.len(),
        });
    }
    Ok(data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}
