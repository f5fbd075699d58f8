//! The per-frame transform-and-draw loop.
//!
//! ## Frame order
//!
//! Every iteration runs the same fixed sequence:
//!
//! ```text
//! tick clock -> upload (if needed) -> begin_frame -> draw per body
//!            -> present -> poll input -> release retired buffers
//!            -> cancel on Escape / close request
//! ```
//!
//! The [`CancellationToken`] is read only at iteration boundaries, so the
//! iteration in which the close request is observed still presents, and
//! nothing is drawn after that present.
//!
//! ## Buffer lifetime
//!
//! With [`UploadPolicy::Once`] each mesh is uploaded on the first frame and
//! re-uploaded into the same handles only after [`FrameLoop::update_mesh`].
//! With [`UploadPolicy::PerFrame`] every frame uploads fresh buffers; they
//! are released one frame later (after the *next* present), never right
//! after the present of the frame that referenced them.  Everything still
//! held is released when the loop shuts down.

use glam::{Mat4, Vec3};

use crate::cancel::CancellationToken;
use crate::color::Color;
use crate::error::{DriverError, LoopError, ScenarioError};
use crate::mesh::{AttributeStream, Mesh};
use crate::scenario::{PrimitiveKind, Scenario};
use crate::time::{FrameClock, Tick, DEFAULT_ANGULAR_VELOCITY};
use crate::transform::compute_mvp;

// ── Backend-facing types ────────────────────────────────────────────────────

/// Opaque identifier of a GPU buffer, issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// The buffers holding one mesh's attribute streams, in location order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshBuffers {
    streams: Vec<(AttributeStream, BufferHandle)>,
}

impl MeshBuffers {
    pub fn get(&self, stream: AttributeStream) -> Option<BufferHandle> {
        self.streams
            .iter()
            .find(|(s, _)| *s == stream)
            .map(|(_, h)| *h)
    }

    pub fn insert(&mut self, stream: AttributeStream, handle: BufferHandle) {
        match self.streams.iter_mut().find(|(s, _)| *s == stream) {
            Some(slot) => slot.1 = handle,
            None => {
                self.streams.push((stream, handle));
                self.streams.sort_by_key(|(s, _)| *s);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeStream, BufferHandle)> + '_ {
        self.streams.iter().copied()
    }

    pub fn handles(&self) -> Vec<BufferHandle> {
        self.streams.iter().map(|(_, h)| *h).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

/// Uniform values for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawUniforms {
    pub mvp: Mat4,
    pub model: Mat4,
    pub view: Mat4,
    pub light_position: Vec3,
}

/// One draw submission over the bound attribute streams.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall<'a> {
    pub primitive: PrimitiveKind,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub buffers: &'a MeshBuffers,
    pub uniforms: DrawUniforms,
    pub depth_test: bool,
}

/// Graphics operations the loop needs.  Implemented by the wgpu renderer and
/// by recording mocks in tests.
pub trait RenderBackend {
    /// Allocates a buffer for `data`, or overwrites `reuse` in place.  Prior
    /// contents of a reused handle are discarded.
    fn upload_stream(
        &mut self,
        stream: AttributeStream,
        data: &[[f32; 3]],
        reuse: Option<BufferHandle>,
    ) -> Result<BufferHandle, DriverError>;

    /// Starts a frame cleared to `clear`.
    fn begin_frame(&mut self, clear: Color) -> Result<(), DriverError>;

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), DriverError>;

    /// Makes the frame visible.  Called exactly once per iteration, after
    /// every draw of that iteration.
    fn present(&mut self) -> Result<(), DriverError>;

    fn release_buffers(&mut self, handles: &[BufferHandle]);

    /// Post-call check: returns (and clears) an error the driver reported
    /// asynchronously since the last check.
    fn take_driver_error(&mut self) -> Option<DriverError> {
        None
    }
}

/// What the host observed while processing pending window events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Escape went down since the previous poll.
    pub escape_pressed: bool,
    pub close_requested: bool,
}

/// Window + input side of the loop.
pub trait ContextHost {
    /// Seconds since the host was initialised.
    fn elapsed(&self) -> f64;

    /// Processes pending window/input events.
    fn poll_events(&mut self) -> InputSnapshot;

    fn should_close(&self) -> bool;
}

// ── Options ─────────────────────────────────────────────────────────────────

/// When mesh data is copied to the GPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "kebab-case"))]
pub enum UploadPolicy {
    /// On the first frame, then only after `update_mesh`.
    #[default]
    Once,
    /// Fresh buffers every frame, released one frame later.
    PerFrame,
}

/// What a driver error does to the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "kebab-case"))]
pub enum ErrorPolicy {
    /// Log a warning and keep rendering.
    #[default]
    Log,
    /// Stop the loop and return the error.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    pub angular_velocity: f32,
    pub upload: UploadPolicy,
    pub errors: ErrorPolicy,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            angular_velocity: DEFAULT_ANGULAR_VELOCITY,
            upload: UploadPolicy::Once,
            errors: ErrorPolicy::Log,
        }
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub draws: u64,
    pub presents: u64,
    /// Attribute streams copied to the GPU.
    pub uploads: u64,
    pub releases: u64,
}

// ── FrameLoop ───────────────────────────────────────────────────────────────

pub struct FrameLoop {
    scenario: Scenario,
    projection: Mat4,
    view: Mat4,
    clock: FrameClock,
    options: LoopOptions,
    token: CancellationToken,
    /// Long-lived buffers per mesh (`UploadPolicy::Once`).
    resident: Vec<Option<MeshBuffers>>,
    dirty: Vec<bool>,
    /// Buffers created for the frame in progress (`UploadPolicy::PerFrame`).
    transient: Vec<BufferHandle>,
    /// Buffers of the previous frame, released after the current present.
    retired: Vec<BufferHandle>,
    stats: LoopStats,
}

impl FrameLoop {
    pub fn new(scenario: Scenario, options: LoopOptions) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let mesh_count = scenario.meshes.len();
        Ok(Self {
            projection: scenario.camera.projection(),
            view: scenario.camera.view(),
            clock: FrameClock::new(options.angular_velocity),
            options,
            token: CancellationToken::new(),
            resident: vec![None; mesh_count],
            dirty: vec![true; mesh_count],
            transient: Vec::new(),
            retired: Vec::new(),
            stats: LoopStats::default(),
            scenario,
        })
    }

    /// Replaces the internal token, e.g. to share one with a signal handler.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// A clone of the loop's stop flag.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Swaps the data of mesh `index`.  The replacement must carry the same
    /// attribute streams; it reaches the GPU on the next frame.
    pub fn update_mesh(&mut self, index: usize, mesh: Mesh) -> Result<(), LoopError> {
        let slot = self
            .scenario
            .meshes
            .get_mut(index)
            .ok_or(LoopError::NoSuchMesh { index })?;
        if slot.streams() != mesh.streams() {
            return Err(LoopError::StreamsChanged { index });
        }
        let vertex_count = mesh.vertex_count();
        let short = self.scenario.bodies.iter().position(|b| {
            b.mesh == index
                && (b.first_vertex >= vertex_count
                    || b.first_vertex.saturating_add(b.resolved_count(vertex_count)) > vertex_count)
        });
        if let Some(body) = short {
            return Err(LoopError::TooShort { index, body });
        }
        *slot = mesh;
        self.dirty[index] = true;
        Ok(())
    }

    /// Runs until the token is cancelled, then releases every buffer.
    pub fn run<B, H>(&mut self, backend: &mut B, host: &mut H) -> Result<LoopStats, LoopError>
    where
        B: RenderBackend + ?Sized,
        H: ContextHost + ?Sized,
    {
        log::info!(
            "running scenario `{}` ({} bodies, {:?} upload)",
            self.scenario.name,
            self.scenario.bodies.len(),
            self.options.upload
        );
        while !self.token.is_cancelled() {
            if let Err(e) = self.step(backend, host) {
                self.shutdown(backend);
                return Err(e);
            }
        }
        self.shutdown(backend);
        log::info!(
            "stopped after {} frames ({} draws, {} uploads, {} releases)",
            self.stats.frames,
            self.stats.draws,
            self.stats.uploads,
            self.stats.releases
        );
        Ok(self.stats)
    }

    /// One full iteration.  Cancels the token when the host reports Escape
    /// or a close request.
    pub fn step<B, H>(&mut self, backend: &mut B, host: &mut H) -> Result<Tick, LoopError>
    where
        B: RenderBackend + ?Sized,
        H: ContextHost + ?Sized,
    {
        let policy = self.options.errors;
        let tick = self.clock.tick(host.elapsed());
        let frame = tick.frame;

        let buffers = self.prepare_buffers(backend, frame)?;

        guard(policy, frame, backend.begin_frame(self.scenario.clear_color))?;
        for body in &self.scenario.bodies {
            // Upload failed under `ErrorPolicy::Log`; nothing to bind.
            let Some(mesh_buffers) = buffers[body.mesh].as_ref() else {
                continue;
            };
            let mesh = &self.scenario.meshes[body.mesh];
            let model = body.motion.model(tick.angle);
            let call = DrawCall {
                primitive: self.scenario.draw_mode,
                first_vertex: body.first_vertex,
                vertex_count: body.resolved_count(mesh.vertex_count()),
                buffers: mesh_buffers,
                uniforms: DrawUniforms {
                    mvp: compute_mvp(&self.projection, &self.view, &model),
                    model,
                    view: self.view,
                    light_position: self.scenario.light_position,
                },
                depth_test: self.scenario.depth_test,
            };
            if guard(policy, frame, backend.draw(&call))?.is_some() {
                self.stats.draws += 1;
            }
        }

        if guard(policy, frame, backend.present())?.is_some() {
            self.stats.presents += 1;
        }

        let input = host.poll_events();

        if !self.retired.is_empty() {
            log::debug!("frame {frame}: releasing {} retired buffers", self.retired.len());
            backend.release_buffers(&self.retired);
            self.stats.releases += self.retired.len() as u64;
        }
        self.retired = std::mem::take(&mut self.transient);

        if policy == ErrorPolicy::Strict || cfg!(debug_assertions) {
            if let Some(err) = backend.take_driver_error() {
                guard::<()>(policy, frame, Err(err))?;
            }
        }

        self.stats.frames += 1;
        if input.escape_pressed || input.close_requested || host.should_close() {
            log::debug!("frame {frame}: exit requested");
            self.token.cancel();
        }
        Ok(tick)
    }

    /// Releases retired, transient and resident buffers.  Idempotent.
    pub fn shutdown<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        let mut handles = std::mem::take(&mut self.retired);
        handles.append(&mut self.transient);
        for (slot, dirty) in self.resident.iter_mut().zip(self.dirty.iter_mut()) {
            if let Some(buffers) = slot.take() {
                handles.extend(buffers.handles());
                *dirty = true;
            }
        }
        if !handles.is_empty() {
            backend.release_buffers(&handles);
            self.stats.releases += handles.len() as u64;
        }
    }

    /// Buffers to bind this frame, one entry per mesh.
    fn prepare_buffers<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        frame: u64,
    ) -> Result<Vec<Option<MeshBuffers>>, LoopError> {
        let policy = self.options.errors;
        let mut out = Vec::with_capacity(self.scenario.meshes.len());

        for (index, mesh) in self.scenario.meshes.iter().enumerate() {
            match self.options.upload {
                UploadPolicy::PerFrame => {
                    let uploaded = upload_mesh(backend, mesh, None);
                    let buffers = guard(policy, frame, uploaded)?;
                    if let Some(b) = &buffers {
                        self.stats.uploads += b.streams.len() as u64;
                        self.transient.extend(b.handles());
                    }
                    out.push(buffers);
                }
                UploadPolicy::Once => {
                    if self.dirty[index] {
                        let uploaded = upload_mesh(backend, mesh, self.resident[index].as_ref());
                        if let Some(b) = guard(policy, frame, uploaded)? {
                            log::debug!("frame {frame}: uploaded mesh {index} ({} streams)", b.streams.len());
                            self.stats.uploads += b.streams.len() as u64;
                            self.resident[index] = Some(b);
                            self.dirty[index] = false;
                        }
                    }
                    out.push(self.resident[index].clone());
                }
            }
        }
        Ok(out)
    }
}

/// Copies every stream of `mesh`, reusing the handles in `reuse` when given.
/// On failure the buffers created by this call are released again.
fn upload_mesh<B: RenderBackend + ?Sized>(
    backend: &mut B,
    mesh: &Mesh,
    reuse: Option<&MeshBuffers>,
) -> Result<MeshBuffers, DriverError> {
    let mut buffers = MeshBuffers::default();
    for stream in mesh.streams().iter() {
        let Some(data) = mesh.stream(stream) else {
            continue;
        };
        let previous = reuse.and_then(|r| r.get(stream));
        match backend.upload_stream(stream, data, previous) {
            Ok(handle) => buffers.insert(stream, handle),
            Err(e) => {
                let fresh: Vec<_> = buffers
                    .iter()
                    .filter(|(s, h)| reuse.and_then(|r| r.get(*s)) != Some(*h))
                    .map(|(_, h)| h)
                    .collect();
                if !fresh.is_empty() {
                    backend.release_buffers(&fresh);
                }
                return Err(e);
            }
        }
    }
    Ok(buffers)
}

/// Applies the error policy: `Ok(Some)` on success, `Ok(None)` for a logged
/// failure, `Err` under `ErrorPolicy::Strict`.
fn guard<T>(
    policy: ErrorPolicy,
    frame: u64,
    result: Result<T, DriverError>,
) -> Result<Option<T>, LoopError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(source) => match policy {
            ErrorPolicy::Log => {
                log::warn!("frame {frame}: {source}");
                Ok(None)
            }
            ErrorPolicy::Strict => Err(LoopError::Driver { frame, source }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverErrorKind;
    use crate::scenario::{Body, Motion};
    use crate::transform::{compute_model, Spin};
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Upload {
            stream: AttributeStream,
            len: usize,
            handle: BufferHandle,
            reused: bool,
        },
        Begin,
        Draw {
            primitive: PrimitiveKind,
            first: u32,
            count: u32,
            mvp: Mat4,
            bound: Vec<BufferHandle>,
        },
        Present,
        Release(Vec<BufferHandle>),
    }

    #[derive(Default)]
    struct Recorder {
        next: u64,
        live: BTreeSet<BufferHandle>,
        events: Vec<Event>,
        fail_uploads: bool,
        fail_presents: bool,
        pending_error: Option<DriverError>,
    }

    impl Recorder {
        fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
            self.events.iter().filter(|e| pred(e)).count()
        }

        fn draws(&self) -> Vec<&Event> {
            self.events
                .iter()
                .filter(|e| matches!(e, Event::Draw { .. }))
                .collect()
        }
    }

    impl RenderBackend for Recorder {
        fn upload_stream(
            &mut self,
            stream: AttributeStream,
            data: &[[f32; 3]],
            reuse: Option<BufferHandle>,
        ) -> Result<BufferHandle, DriverError> {
            if self.fail_uploads {
                return Err(DriverError::new(DriverErrorKind::OutOfMemory, "no room"));
            }
            let handle = match reuse {
                Some(h) => h,
                None => {
                    self.next += 1;
                    BufferHandle(self.next)
                }
            };
            self.live.insert(handle);
            self.events.push(Event::Upload {
                stream,
                len: data.len(),
                handle,
                reused: reuse.is_some(),
            });
            Ok(handle)
        }

        fn begin_frame(&mut self, _clear: Color) -> Result<(), DriverError> {
            self.events.push(Event::Begin);
            Ok(())
        }

        fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), DriverError> {
            for h in call.buffers.handles() {
                assert!(self.live.contains(&h), "draw bound released buffer {h:?}");
            }
            self.events.push(Event::Draw {
                primitive: call.primitive,
                first: call.first_vertex,
                count: call.vertex_count,
                mvp: call.uniforms.mvp,
                bound: call.buffers.handles(),
            });
            Ok(())
        }

        fn present(&mut self) -> Result<(), DriverError> {
            self.events.push(Event::Present);
            if self.fail_presents {
                return Err(DriverError::new(DriverErrorKind::Surface, "surface lost"));
            }
            Ok(())
        }

        fn release_buffers(&mut self, handles: &[BufferHandle]) {
            for h in handles {
                assert!(self.live.remove(h), "double release of {h:?}");
            }
            self.events.push(Event::Release(handles.to_vec()));
        }

        fn take_driver_error(&mut self) -> Option<DriverError> {
            self.pending_error.take()
        }
    }

    /// Advances 1/60 s per poll and requests close on poll `close_at`
    /// (1-based) or presses Escape on poll `escape_at`.
    struct ScriptedHost {
        now: f64,
        polls: u64,
        close_at: Option<u64>,
        escape_at: Option<u64>,
        closed: bool,
    }

    impl ScriptedHost {
        fn closing_at(poll: u64) -> Self {
            Self { now: 0.0, polls: 0, close_at: Some(poll), escape_at: None, closed: false }
        }

        fn escape_at(poll: u64) -> Self {
            Self { now: 0.0, polls: 0, close_at: None, escape_at: Some(poll), closed: false }
        }
    }

    impl ContextHost for ScriptedHost {
        fn elapsed(&self) -> f64 {
            self.now
        }

        fn poll_events(&mut self) -> InputSnapshot {
            self.polls += 1;
            self.now += 1.0 / 60.0;
            let close = self.close_at == Some(self.polls);
            self.closed |= close;
            InputSnapshot {
                escape_pressed: self.escape_at == Some(self.polls),
                close_requested: close,
            }
        }

        fn should_close(&self) -> bool {
            self.closed
        }
    }

    fn triangle_loop(options: LoopOptions) -> FrameLoop {
        FrameLoop::new(Scenario::builtin("triangle").unwrap(), options).unwrap()
    }

    #[test]
    fn one_iteration_draws_once_and_presents_once() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(1);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(stats.presents, 1);
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert!(matches!(
            draws[0],
            Event::Draw { primitive: PrimitiveKind::Triangles, first: 0, count: 3, .. }
        ));
        assert_eq!(backend.count(|e| *e == Event::Present), 1);
    }

    #[test]
    fn stops_after_iteration_that_sees_close_request() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(3);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();

        assert_eq!(stats.frames, 3);
        assert_eq!(host.polls, 3);
        let last_present = backend
            .events
            .iter()
            .rposition(|e| *e == Event::Present)
            .unwrap();
        assert!(backend.events[last_present..]
            .iter()
            .all(|e| !matches!(e, Event::Draw { .. } | Event::Begin)));
    }

    #[test]
    fn escape_edge_stops_the_loop() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::escape_at(2);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();
        assert_eq!(stats.frames, 2);
        assert!(!host.should_close());
    }

    #[test]
    fn cancelled_token_skips_the_loop() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(1);
        let mut frame_loop = triangle_loop(LoopOptions::default());
        frame_loop.token().cancel();
        let stats = frame_loop.run(&mut backend, &mut host).unwrap();
        assert_eq!(stats, LoopStats::default());
        assert!(backend.events.is_empty());
    }

    #[test]
    fn upload_once_keeps_buffers_until_shutdown() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(4);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();

        assert_eq!(stats.uploads, 1);
        assert_eq!(backend.count(|e| matches!(e, Event::Upload { .. })), 1);
        // the only release is the shutdown one, after the last present
        assert_eq!(backend.events.last(), Some(&Event::Release(vec![BufferHandle(1)])));
        assert!(backend.live.is_empty());
    }

    #[test]
    fn per_frame_upload_defers_release_by_one_frame() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(3);
        let options = LoopOptions { upload: UploadPolicy::PerFrame, ..Default::default() };
        let stats = triangle_loop(options).run(&mut backend, &mut host).unwrap();

        assert_eq!(stats.uploads, 3);
        assert_eq!(stats.releases, 3);
        assert!(backend.live.is_empty());

        let presents: Vec<usize> = backend
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == Event::Present)
            .map(|(i, _)| i)
            .collect();
        let release_of = |h: u64| {
            backend
                .events
                .iter()
                .position(|e| matches!(e, Event::Release(v) if v.contains(&BufferHandle(h))))
                .unwrap()
        };
        // frame 0's buffer goes after frame 1's present, frame 1's after frame 2's
        assert!(release_of(1) > presents[1] && release_of(1) < presents[2]);
        assert!(release_of(2) > presents[2]);
        // frame 2's buffer is released at shutdown
        assert_eq!(backend.events.last(), Some(&Event::Release(vec![BufferHandle(3)])));
    }

    #[test]
    fn update_mesh_reuploads_into_the_same_handles() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(u64::MAX);
        let mut frame_loop = triangle_loop(LoopOptions::default());

        frame_loop.step(&mut backend, &mut host).unwrap();
        let bigger = Mesh::from_flat(&[0.0; 18]).unwrap();
        frame_loop.update_mesh(0, bigger).unwrap();
        frame_loop.step(&mut backend, &mut host).unwrap();
        frame_loop.step(&mut backend, &mut host).unwrap();

        let uploads: Vec<_> = backend
            .events
            .iter()
            .filter(|e| matches!(e, Event::Upload { .. }))
            .collect();
        assert_eq!(uploads.len(), 2);
        assert_eq!(
            uploads[1],
            &Event::Upload {
                stream: AttributeStream::Position,
                len: 6,
                handle: BufferHandle(1),
                reused: true,
            }
        );
        assert!(matches!(backend.draws()[2], Event::Draw { count: 6, .. }));
    }

    #[test]
    fn update_mesh_rejects_bad_replacements() {
        let mut frame_loop = triangle_loop(LoopOptions::default());
        let colored = Mesh::from_flat(&[0.0; 9])
            .and_then(|m| m.with_uniform_color([1.0, 1.0, 1.0]))
            .unwrap();
        assert_eq!(
            frame_loop.update_mesh(0, colored.clone()),
            Err(LoopError::StreamsChanged { index: 0 })
        );
        assert_eq!(
            frame_loop.update_mesh(5, colored),
            Err(LoopError::NoSuchMesh { index: 5 })
        );

        let mut twin = FrameLoop::new(
            Scenario::builtin("twin-spin").unwrap(),
            LoopOptions::default(),
        )
        .unwrap();
        let short = Mesh::from_flat(&[0.0; 18])
            .and_then(|m| m.with_uniform_color([1.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(
            twin.update_mesh(0, short),
            Err(LoopError::TooShort { index: 0, body: 0 })
        );
    }

    #[test]
    fn twin_bodies_spin_in_opposite_directions() {
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(u64::MAX);
        host.now = 0.5;
        let mut frame_loop = FrameLoop::new(
            Scenario::builtin("twin-spin").unwrap(),
            LoopOptions::default(),
        )
        .unwrap();
        let tick = frame_loop.step(&mut backend, &mut host).unwrap();

        let (p, v) = (frame_loop.projection(), frame_loop.view());
        let expected = [
            compute_mvp(&p, &v, &compute_model(tick.angle, Spin::Forward)),
            compute_mvp(&p, &v, &compute_model(tick.angle, Spin::Reverse)),
        ];
        let draws = backend.draws();
        assert_eq!(draws.len(), 2);
        for (draw, want) in draws.iter().zip(expected) {
            match draw {
                Event::Draw { count, mvp, bound, .. } => {
                    assert_eq!(*count, 9);
                    assert_eq!(*mvp, want);
                    // position + color
                    assert_eq!(bound.len(), 2);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn custom_bodies_draw_their_range() {
        let mut scenario = Scenario::builtin("twin-spin").unwrap();
        scenario.bodies = vec![Body::range(0, 9, 3, Motion::Fixed(Mat4::IDENTITY))];
        let mut backend = Recorder::default();
        let mut host = ScriptedHost::closing_at(1);
        FrameLoop::new(scenario, LoopOptions::default())
            .unwrap()
            .run(&mut backend, &mut host)
            .unwrap();
        assert!(matches!(backend.draws()[0], Event::Draw { first: 9, count: 3, .. }));
    }

    #[test]
    fn strict_policy_stops_on_driver_error() {
        let mut backend = Recorder {
            pending_error: Some(DriverError::new(DriverErrorKind::Validation, "bad bind")),
            ..Default::default()
        };
        let mut host = ScriptedHost::closing_at(10);
        let options = LoopOptions { errors: ErrorPolicy::Strict, ..Default::default() };
        let err = triangle_loop(options).run(&mut backend, &mut host).unwrap_err();

        assert!(matches!(err, LoopError::Driver { frame: 0, .. }));
        // the frame that failed was still presented and its buffers released
        assert_eq!(backend.count(|e| *e == Event::Present), 1);
        assert!(backend.live.is_empty());
    }

    #[test]
    fn log_policy_warns_on_driver_error_and_continues() {
        let mut backend = Recorder {
            pending_error: Some(DriverError::new(DriverErrorKind::Validation, "bad bind")),
            ..Default::default()
        };
        let mut host = ScriptedHost::closing_at(3);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();

        assert_eq!(stats.frames, 3);
        assert_eq!(stats.draws, 3);
        assert_eq!(stats.presents, 3);
        // only debug builds poll the driver under the log policy
        assert_eq!(backend.pending_error.is_none(), cfg!(debug_assertions));
        assert!(backend.live.is_empty());
    }

    #[test]
    fn failed_presents_are_not_counted() {
        let mut backend = Recorder { fail_presents: true, ..Default::default() };
        let mut host = ScriptedHost::closing_at(2);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.presents, 0);
        assert_eq!(backend.count(|e| *e == Event::Present), 2);
    }

    #[test]
    fn log_policy_keeps_going_without_buffers() {
        let mut backend = Recorder { fail_uploads: true, ..Default::default() };
        let mut host = ScriptedHost::closing_at(2);
        let stats = triangle_loop(LoopOptions::default())
            .run(&mut backend, &mut host)
            .unwrap();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.draws, 0);
        assert_eq!(stats.presents, 2);
    }

    #[test]
    fn mesh_buffers_stay_in_location_order() {
        let mut b = MeshBuffers::default();
        b.insert(AttributeStream::Normal, BufferHandle(7));
        b.insert(AttributeStream::Position, BufferHandle(5));
        b.insert(AttributeStream::Normal, BufferHandle(9));
        assert_eq!(b.handles(), vec![BufferHandle(5), BufferHandle(9)]);
        assert_eq!(b.get(AttributeStream::Color), None);
    }
}
