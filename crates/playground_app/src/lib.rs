//! Runs playground scenarios in a window.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use playground_app::App;
//!
//! fn main() {
//!     let code = App::new("lit-cube").with_title("Playground").run();
//!     std::process::exit(code);
//! }
//! ```
//!
//! | Module     | Responsibility                                          |
//! |------------|---------------------------------------------------------|
//! | `builder`  | `App` builder, `AppConfig` (TOML)                       |
//! | `host`     | `WinitHost`: window, event pumping, Escape/close        |
//! | `graphics` | Surface + renderer bound to the host window             |
//! | `input`    | Key state with per-poll press edges                     |
//! | `logging`  | fern dispatcher on stderr                               |
//! | `runner`   | Bootstrap, loop, teardown, exit codes                   |

pub mod builder;
pub mod error;
mod graphics;
pub mod host;
pub mod input;
pub mod logging;
pub mod runner;

pub use builder::{App, AppConfig, RunConfig, WindowConfig};
pub use error::InitError;
pub use host::WinitHost;
pub use input::{InputState, KeyCode};
pub use runner::{EXIT_DRIVER_FAILURE, EXIT_INIT_FAILURE, EXIT_OK};

// ── Re-export the most-used playground_core types ─────────────────────────
pub use playground_core::{
    CancellationToken, Color, ErrorPolicy, LoopStats, Scenario, Spin, UploadPolicy,
};
