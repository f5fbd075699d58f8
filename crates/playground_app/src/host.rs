//! Window + input side of the frame loop on top of winit.
//!
//! The frame loop blocks and drives the window itself, so instead of handing
//! control to `EventLoop::run_app` the host pumps pending events once per
//! poll with a zero timeout.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use playground_core::{ContextHost, InputSnapshot};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::builder::WindowConfig;
use crate::error::InitError;
use crate::input::{InputState, KeyCode};

/// Latest size reported by the window, taken by whoever owns the surface.
pub type ResizeSignal = Rc<Cell<Option<(u32, u32)>>>;

/// Pumps before giving up on the window appearing.
const STARTUP_PUMPS: usize = 16;

struct HostState {
    /// Consumed when the window is created.
    attributes: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    create_error: Option<String>,
    input: InputState,
    close_requested: bool,
    resized: ResizeSignal,
}

impl ApplicationHandler for HostState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.input.update_key(code, state.is_pressed()),
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::Resized(size) => self.resized.set(Some((size.width, size.height))),
            _ => {}
        }
    }
}

pub struct WinitHost {
    window: Arc<Window>,
    state: HostState,
    started: Instant,
    // Dropped last, after every window handle.
    event_loop: EventLoop<()>,
}

impl WinitHost {
    /// Opens the window described by `config`.
    pub fn new(config: &WindowConfig) -> Result<Self, InitError> {
        let mut event_loop = EventLoop::new()?;
        let attributes = Window::default_attributes()
            .with_title(config.title.as_str())
            .with_resizable(config.resizable)
            .with_inner_size(PhysicalSize::new(config.width, config.height));

        let mut state = HostState {
            attributes: Some(attributes),
            window: None,
            create_error: None,
            input: InputState::new(),
            close_requested: false,
            resized: Rc::new(Cell::new(None)),
        };

        // Desktop platforms deliver `resumed` on the first pump.
        for _ in 0..STARTUP_PUMPS {
            if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut state) {
                return Err(InitError::Window(format!("event loop exited during startup ({code})")));
            }
            if let Some(err) = state.create_error.take() {
                return Err(InitError::Window(err));
            }
            if state.window.is_some() {
                break;
            }
        }
        let window = state
            .window
            .clone()
            .ok_or_else(|| InitError::Window("window never became available".into()))?;

        let size = window.inner_size();
        log::info!("opened window \"{}\" ({}x{})", config.title, size.width, size.height);

        Ok(Self {
            window,
            state,
            started: Instant::now(),
            event_loop,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn resize_signal(&self) -> ResizeSignal {
        Rc::clone(&self.state.resized)
    }

    fn pump(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            log::debug!("event loop exited ({code})");
            self.state.close_requested = true;
        }
    }
}

impl ContextHost for WinitHost {
    fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    fn poll_events(&mut self) -> InputSnapshot {
        self.state.input.begin_poll();
        self.pump();
        InputSnapshot {
            escape_pressed: self.state.input.just_pressed(KeyCode::Escape),
            close_requested: self.state.close_requested,
        }
    }

    fn should_close(&self) -> bool {
        self.state.close_requested
    }
}
