//! Clocks and timers
//!
//! A [`Clock`] measures relative time in whole milliseconds. It can be paused,
//! scaled (a negative scale runs it backwards) and optionally bounded by an
//! inclusive wrap limit. Forward updates that run past the limit clamp to it and
//! report a wrap; backward updates clamp at zero and never report one.

/// Converts seconds to whole milliseconds, truncating toward zero.
#[inline]
pub fn seconds_to_ms(seconds: f32) -> i64 {
    (seconds * 1000.0) as i64
}

/// Converts milliseconds to seconds.
#[inline]
pub fn ms_to_seconds(ms: i64) -> f32 {
    ms as f32 / 1000.0
}

/// A clock that measures relative time passed
#[derive(Clone, Debug, PartialEq)]
pub struct Clock {
    /// Absolute time at which the clock began, in milliseconds
    initial_time: u32,
    /// Relative time passed since the clock began, in milliseconds
    time: u32,
    previous_time: u32,
    /// Signed change applied by the last update
    delta_ms: i64,
    scale: f32,
    paused: bool,
    /// Inclusive maximum of `time`
    wrap_limit: Option<u32>,
    /// Milliseconds past the wrap limit on the last wrapping update
    overflow_ms: u32,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Create a clock that began at an absolute time, in milliseconds
    pub fn starting_at(initial_time_ms: u32) -> Self {
        Self {
            initial_time: initial_time_ms,
            time: 0,
            previous_time: 0,
            delta_ms: 0,
            scale: 1.0,
            paused: false,
            wrap_limit: None,
            overflow_ms: 0,
        }
    }

    /// Builder: bound the clock with an inclusive wrap limit
    pub fn with_wrap(mut self, limit: u32) -> Self {
        self.set_wrap(Some(limit));
        self
    }

    /// Builder: set the scale factor
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Advance the clock by `delta_seconds` of real time, multiplied by the
    /// scale factor. Returns true if the wrap limit was reached.
    pub fn update(&mut self, delta_seconds: f32) -> bool {
        self.begin_step();
        if self.paused {
            return false;
        }
        self.advance(seconds_to_ms(self.scale * delta_seconds))
    }

    /// Same as [`Clock::update`], for a delta already expressed in milliseconds.
    ///
    /// Clips use this to consume exactly the change their timeline applied,
    /// without a round trip through floating point seconds.
    pub fn update_ms(&mut self, delta_ms: i64) -> bool {
        self.begin_step();
        if self.paused {
            return false;
        }
        let change = (f64::from(self.scale) * delta_ms as f64) as i64;
        self.advance(change)
    }

    /// Step forward (or backward, for negative `frames`) by a number of frames.
    /// Ignores the scale factor and the pause state.
    pub fn step_frames(&mut self, frames: i32, frame_period: f32) -> bool {
        self.begin_step();
        self.advance(seconds_to_ms(frames as f32 * frame_period))
    }

    fn begin_step(&mut self) {
        self.previous_time = self.time;
        self.delta_ms = 0;
        self.overflow_ms = 0;
    }

    fn advance(&mut self, change: i64) -> bool {
        let wrapped = if change >= 0 {
            let target = u64::from(self.time) + change as u64;
            match self.wrap_limit {
                Some(limit) if target > u64::from(limit) => {
                    let past = target - u64::from(limit) - 1;
                    self.overflow_ms = past.min(u64::from(u32::MAX)) as u32;
                    self.time = limit;
                    true
                }
                _ => {
                    self.time = target.min(u64::from(u32::MAX)) as u32;
                    false
                }
            }
        } else {
            // No wrap signal at the lower bound, only clamping.
            self.time = (i64::from(self.time) + change).max(0) as u32;
            false
        };

        self.delta_ms = if wrapped {
            change
        } else {
            i64::from(self.time) - i64::from(self.previous_time)
        };
        wrapped
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stretch the clock by a scale factor. Negative factors run it backwards
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Whether the clock currently runs backwards
    pub fn is_reversed(&self) -> bool {
        self.scale < 0.0
    }

    /// Relative time passed, in milliseconds
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Set the time, clamped to the wrap limit. The delta is reset to zero.
    pub fn set_time(&mut self, time_ms: u32) {
        self.time = match self.wrap_limit {
            Some(limit) => time_ms.min(limit),
            None => time_ms,
        };
        self.previous_time = self.time;
        self.delta_ms = 0;
        self.overflow_ms = 0;
    }

    /// The absolute time the clock began at, in milliseconds
    pub fn initial_time(&self) -> u32 {
        self.initial_time
    }

    /// Bound the clock with an inclusive wrap limit, or remove the bound
    pub fn set_wrap(&mut self, limit: Option<u32>) {
        self.wrap_limit = limit;
        if let Some(limit) = limit {
            self.time = self.time.min(limit);
            self.previous_time = self.previous_time.min(limit);
        }
    }

    pub fn wrap_limit(&self) -> Option<u32> {
        self.wrap_limit
    }

    /// Signed change applied by the last update, in milliseconds.
    ///
    /// For a wrapping update this is the full requested change, including the
    /// part that ran past the wrap limit.
    pub fn delta_ms(&self) -> i64 {
        self.delta_ms
    }

    /// Signed change applied by the last update, in seconds
    pub fn delta_seconds(&self) -> f32 {
        ms_to_seconds(self.delta_ms)
    }

    /// Milliseconds past the wrap limit on the last update, zero if it did not wrap
    pub fn overflow_ms(&self) -> u32 {
        self.overflow_ms
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// A stopwatch measured against a [`Clock`].
///
/// Only meant for timing that never runs backwards; ticks saturate at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    start_ticks: u32,
    paused_ticks: u32,
    started: bool,
    paused: bool,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, clock: &Clock) {
        self.started = true;
        self.paused = false;
        self.paused_ticks = 0;
        self.start_ticks = clock.time();
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    pub fn pause(&mut self, clock: &Clock) {
        if self.started && !self.paused {
            self.paused = true;
            self.paused_ticks = clock.time().saturating_sub(self.start_ticks);
            self.start_ticks = 0;
        }
    }

    pub fn resume(&mut self, clock: &Clock) {
        if self.started && self.paused {
            self.paused = false;
            self.start_ticks = clock.time().saturating_sub(self.paused_ticks);
            self.paused_ticks = 0;
        }
    }

    /// Milliseconds of clock time since the timer was started
    pub fn ticks(&self, clock: &Clock) -> u32 {
        if !self.started {
            0
        } else if self.paused {
            self.paused_ticks
        } else {
            clock.time().saturating_sub(self.start_ticks)
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
