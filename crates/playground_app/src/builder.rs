use std::path::Path;

use playground_core::{CancellationToken, ErrorPolicy, UploadPolicy};
use serde::Deserialize;

use crate::error::InitError;

/// Window and surface settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// MSAA level; 0 or 1 disables multisampling, anything higher uses 4.
    pub samples: u32,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Playground".to_string(),
            width: 1024,
            height: 768,
            samples: 4,
            resizable: false,
            vsync: true,
        }
    }
}

/// What runs inside the window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub scenario: String,
    pub upload: UploadPolicy,
    pub errors: ErrorPolicy,
    /// Radians per second.
    pub angular_velocity: f32,
    pub log_level: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            scenario: "lit-cube".to_string(),
            upload: UploadPolicy::Once,
            errors: ErrorPolicy::Log,
            angular_velocity: std::f32::consts::FRAC_PI_2,
            log_level: "info".to_string(),
        }
    }
}

/// Startup configuration, usually read from a TOML file:
///
/// ```toml
/// [window]
/// samples = 1
///
/// [run]
/// scenario = "twin-spin"
/// upload = "per-frame"
/// errors = "strict"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub run: RunConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, InitError> {
        let text = std::fs::read_to_string(path).map_err(|e| InitError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|e| InitError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Entry point.  Builder-style setup over an [`AppConfig`]:
///
/// ```rust,ignore
/// let code = App::new("twin-spin")
///     .with_samples(1)
///     .with_errors(ErrorPolicy::Strict)
///     .run();
/// std::process::exit(code);
/// ```
pub struct App {
    config: AppConfig,
    token: CancellationToken,
}

impl App {
    pub fn new(scenario: &str) -> Self {
        let mut config = AppConfig::default();
        config.run.scenario = scenario.to_string();
        Self::from_config(config)
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            config,
            token: CancellationToken::new(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.window.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.window.width = width;
        self.config.window.height = height;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.config.window.samples = samples;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.config.window.resizable = resizable;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.window.vsync = vsync;
        self
    }

    pub fn with_upload(mut self, upload: UploadPolicy) -> Self {
        self.config.run.upload = upload;
        self
    }

    pub fn with_errors(mut self, errors: ErrorPolicy) -> Self {
        self.config.run.errors = errors;
        self
    }

    pub fn with_angular_velocity(mut self, radians_per_second: f32) -> Self {
        self.config.run.angular_velocity = radians_per_second;
        self
    }

    /// Shares a stop flag with the caller; cancelling it ends the loop at
    /// the next iteration boundary.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs to completion and returns the process exit code.
    pub fn run(self) -> i32 {
        crate::runner::run_internal(&self.config, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.window.title, "Playground");
        assert_eq!((config.window.width, config.window.height), (1024, 768));
        assert_eq!(config.window.samples, 4);
        assert!(!config.window.resizable);
        assert_eq!(config.run.scenario, "lit-cube");
        assert_eq!(config.run.upload, UploadPolicy::Once);
        assert_eq!(config.run.errors, ErrorPolicy::Log);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [window]
            samples = 1

            [run]
            scenario = "twin-spin"
            upload = "per-frame"
            errors = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.window.samples, 1);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.run.scenario, "twin-spin");
        assert_eq!(config.run.upload, UploadPolicy::PerFrame);
        assert_eq!(config.run.errors, ErrorPolicy::Strict);
        assert_eq!(config.run.log_level, "info");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_toml("[window]\nfullscreen = true\n").is_err());
        assert!(AppConfig::from_toml("[run]\nupload = \"sometimes\"\n").is_err());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = AppConfig::load(Path::new("no/such/playground.toml")).unwrap_err();
        assert!(matches!(err, InitError::Config { .. }));
    }

    #[test]
    fn builder_overrides_config() {
        let app = App::new("outline")
            .with_size(640, 480)
            .with_samples(0)
            .with_upload(UploadPolicy::PerFrame);
        let c = app.config();
        assert_eq!(c.run.scenario, "outline");
        assert_eq!((c.window.width, c.window.height), (640, 480));
        assert_eq!(c.window.samples, 0);
        assert_eq!(c.run.upload, UploadPolicy::PerFrame);
    }
}
