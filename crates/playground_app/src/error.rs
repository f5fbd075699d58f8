use std::path::PathBuf;

use playground_core::ScenarioError;
use playground_renderer::ShaderError;
use thiserror::Error;

/// Failures before the first frame.  Every variant is fatal and maps to
/// exit code [`EXIT_INIT_FAILURE`](crate::runner::EXIT_INIT_FAILURE).
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create the window: {0}")]
    Window(String),
    #[error("failed to create the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("graphics setup failed: {0:#}")]
    Graphics(anyhow::Error),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("invalid config `{}`: {message}", .path.display())]
    Config { path: PathBuf, message: String },
    #[error("unknown log level `{0}`")]
    LogLevel(String),
    #[error("logger already installed: {0}")]
    Logging(#[from] log::SetLoggerError),
}
