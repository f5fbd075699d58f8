//! Frame timing.
//!
//! `FrameClock` is created once before the loop starts and ticked at the top
//! of every iteration with the host's current time.  It owns the only piece
//! of simulation state the playground has: the accumulated rotation angle.
//!
//! # Example
//! ```rust,ignore
//! let mut clock = FrameClock::new(std::f32::consts::FRAC_PI_2);
//! let tick = clock.tick(host.elapsed());
//! let model = compute_model(tick.angle, Spin::Forward);
//! ```

/// Default spin rate in radians per second (a quarter turn per second).
pub const DEFAULT_ANGULAR_VELOCITY: f32 = std::f32::consts::FRAC_PI_2;

/// Snapshot produced by [`FrameClock::tick`].
///
/// `Copy`, so the loop can hand it to every body it draws this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Seconds since the previous tick, never negative.
    pub delta: f32,
    /// Accumulated rotation angle in radians.
    pub angle: f32,
    /// 0-based index of this frame.
    pub frame: u64,
    /// Instantaneous frames-per-second derived from `delta`.
    pub fps: f32,
}

/// Stateful per-run timer.
///
/// The clock does not read a time source itself; the caller passes `now`
/// (seconds since the host was initialised) so the same clock works with
/// a real window and with scripted hosts in tests.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame_time: f64,
    angle: f32,
    angular_velocity: f32,
    frame_count: u64,
}

impl FrameClock {
    /// New clock at time zero with a zero angle.
    pub fn new(angular_velocity: f32) -> Self {
        Self {
            last_frame_time: 0.0,
            angle: 0.0,
            angular_velocity,
            frame_count: 0,
        }
    }

    /// Current angle without advancing.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Time recorded by the last tick.
    #[inline]
    pub fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }

    /// Advance by one frame.
    ///
    /// `delta = now - last_frame_time`, clamped to zero when the time source
    /// goes backwards; `angle += angular_velocity * delta`.  A regressed
    /// reading still becomes the new `last_frame_time` so the next delta is
    /// measured from it.
    pub fn tick(&mut self, now: f64) -> Tick {
        let delta = ((now - self.last_frame_time) as f32).max(0.0);
        self.last_frame_time = now;
        self.angle += self.angular_velocity * delta;

        let frame = self.frame_count;
        self.frame_count += 1;

        let fps = if delta > 0.0 { 1.0 / delta } else { 0.0 };
        Tick {
            delta,
            angle: self.angle,
            frame,
            fps,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_ANGULAR_VELOCITY)
    }
}
