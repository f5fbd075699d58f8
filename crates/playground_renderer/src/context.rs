use std::sync::{Arc, Mutex};

use anyhow::Context as _;
use playground_core::{DriverError, DriverErrorKind};
use thiserror::Error;

/// Holds the main wgpu objects shared by the renderer.
///
/// `Device` and `Queue` are `Arc`-wrapped so resource helpers can keep a
/// clone; the instance and adapter are only needed during setup.
pub struct EngineContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    /// Last error the device reported outside an error scope.
    driver_error: Arc<Mutex<Option<DriverError>>>,
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("no suitable graphics adapter found")]
    AdapterUnavailable,
    #[error("device request failed: {0}")]
    DeviceRequest(String),
    #[error("could not create a surface for the window: {0}")]
    Surface(String),
}

impl EngineContext {
    /// An instance over every backend wgpu was built with.
    pub fn new_instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Creates a context from an existing `Instance`, picking an adapter
    /// that can present to `compatible_surface` when one is given.
    pub async fn new_with_instance(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .context(ContextError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!("selected adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Playground Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| ContextError::DeviceRequest(e.to_string()))?;

        // Without a handler wgpu panics on the first uncaptured error.
        let driver_error = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&driver_error);
        device.on_uncaptured_error(Box::new(move |error: wgpu::Error| {
            let error = driver_error_from(&error);
            log::debug!("uncaptured {error}");
            if let Ok(mut slot) = sink.lock() {
                slot.get_or_insert(error);
            }
        }));

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            driver_error,
        })
    }

    /// Takes the first error reported since the previous call.
    pub fn take_driver_error(&self) -> Option<DriverError> {
        self.driver_error.lock().ok().and_then(|mut slot| slot.take())
    }
}

pub(crate) fn driver_error_from(error: &wgpu::Error) -> DriverError {
    let kind = match error {
        wgpu::Error::OutOfMemory { .. } => DriverErrorKind::OutOfMemory,
        wgpu::Error::Validation { .. } => DriverErrorKind::Validation,
        _ => DriverErrorKind::Internal,
    };
    DriverError::new(kind, error.to_string())
}
