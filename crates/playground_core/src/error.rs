use thiserror::Error;

use crate::mesh::AttributeStream;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    Empty,
    #[error("{} stream has {len} floats, not a multiple of 3", .stream.name())]
    Ragged { stream: AttributeStream, len: usize },
    #[error("{} stream has {actual} entries, expected {expected} (one per vertex)", .stream.name())]
    LengthMismatch {
        stream: AttributeStream,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("unknown scenario `{0}`")]
    Unknown(String),
    #[error("scenario `{0}` has no meshes")]
    NoMeshes(String),
    #[error("scenario `{0}` has no bodies to draw")]
    NoBodies(String),
    #[error("body {body} references mesh {mesh}, but only {available} meshes exist")]
    MissingMesh {
        body: usize,
        mesh: usize,
        available: usize,
    },
    #[error("body {body} draws vertices {first}..{end}, mesh only has {vertex_count}")]
    RangeOutOfBounds {
        body: usize,
        first: u32,
        end: u32,
        vertex_count: u32,
    },
    #[error("mesh {0} carries a different set of attribute streams than mesh 0")]
    MixedStreams(usize),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Category of a failure reported by the graphics driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverErrorKind {
    /// The driver rejected a call (bad state, bad arguments).
    Validation,
    OutOfMemory,
    /// Acquiring or presenting the window surface failed.
    Surface,
    /// A buffer handle the backend never issued, or already released.
    UnknownBuffer,
    Internal,
}

/// A non-fatal error surfaced by a post-call driver check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} driver error: {message}")]
pub struct DriverError {
    pub kind: DriverErrorKind,
    pub message: String,
}

impl DriverError {
    pub fn new(kind: DriverErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoopError {
    /// Only returned under [`ErrorPolicy::Strict`](crate::ErrorPolicy::Strict).
    #[error("frame {frame}: {source}")]
    Driver {
        frame: u64,
        #[source]
        source: DriverError,
    },
    #[error("mesh {index} does not exist")]
    NoSuchMesh { index: usize },
    #[error("replacement for mesh {index} changes its attribute streams")]
    StreamsChanged { index: usize },
    #[error("replacement for mesh {index} is too short for body {body}")]
    TooShort { index: usize, body: usize },
}
