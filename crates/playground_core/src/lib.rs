//! playground_core: GPU-free building blocks of the playground.
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | `time`       | `FrameClock`: delta time and accumulated angle          |
//! | `transform`  | Y-axis spin matrices, MVP composition, fixed camera     |
//! | `mesh`       | Attribute streams and their length invariant            |
//! | `scenario`   | Per-step configuration records and the bundled steps    |
//! | `frame_loop` | `FrameLoop` plus the backend/host traits it drives      |
//! | `cancel`     | Cooperative stop flag checked between iterations        |

pub mod cancel;
pub mod color;
pub mod error;
pub mod frame_loop;
pub mod mesh;
pub mod scenario;
pub mod time;
pub mod transform;

pub use cancel::CancellationToken;
pub use color::Color;
pub use error::{DriverError, DriverErrorKind, LoopError, MeshError, ScenarioError};
pub use frame_loop::{
    BufferHandle, ContextHost, DrawCall, DrawUniforms, ErrorPolicy, FrameLoop, InputSnapshot,
    LoopOptions, LoopStats, MeshBuffers, RenderBackend, UploadPolicy,
};
pub use mesh::{AttributeStream, Mesh, StreamSet};
pub use scenario::{Body, Motion, PrimitiveKind, Scenario, ShaderPaths};
pub use time::{FrameClock, Tick};
pub use transform::{compute_model, compute_mvp, Camera, Spin};

// re-export glam so downstream crates use the same version
pub use glam;
