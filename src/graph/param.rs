//! Scheduled audio parameters
//!
//! [`AudioParam`] models a sample-accurate, linearly ramped parameter on the
//! context clock. Ramps are scheduled ahead of time and evaluated on demand,
//! so intermediate values are exact interpolations rather than tick-stepped
//! approximations. Scheduling a new ramp cancels the pending one, starting
//! from the value evaluated at the scheduling instant.

/// A single linear ramp segment
#[derive(Debug, Clone, Copy)]
struct Ramp {
    start_time: f64,
    start_value: f32,
    end_time: f64,
    end_value: f32,
}

impl Ramp {
    fn value_at(&self, time: f64) -> f32 {
        if time <= self.start_time {
            return self.start_value;
        }
        if time >= self.end_time {
            return self.end_value;
        }
        let span = self.end_time - self.start_time;
        let t = ((time - self.start_time) / span) as f32;
        self.start_value + (self.end_value - self.start_value) * t
    }
}

/// A scalar parameter with linear ramp scheduling
#[derive(Debug, Clone)]
pub struct AudioParam {
    base: f32,
    ramp: Option<Ramp>,
}

impl AudioParam {
    /// Create a parameter holding a fixed value
    pub fn new(value: f32) -> Self {
        Self {
            base: value,
            ramp: None,
        }
    }

    /// Evaluate the parameter at a point in time
    pub fn value_at(&self, time: f64) -> f32 {
        match self.ramp {
            Some(ramp) => ramp.value_at(time),
            None => self.base,
        }
    }

    /// Set the value immediately, cancelling any pending ramp
    pub fn set_value_at(&mut self, value: f32, _time: f64) {
        self.base = value;
        self.ramp = None;
    }

    /// Ramp linearly from the current value to `target` over `duration_secs`,
    /// starting at `now`. A non-positive duration sets the value immediately.
    pub fn linear_ramp_to(&mut self, target: f32, now: f64, duration_secs: f64) {
        let start_value = self.value_at(now);
        self.base = target;
        if duration_secs <= 0.0 {
            self.ramp = None;
            return;
        }
        self.ramp = Some(Ramp {
            start_time: now,
            start_value,
            end_time: now + duration_secs,
            end_value: target,
        });
    }

    /// The value the parameter will settle at once pending ramps complete
    pub fn target(&self) -> f32 {
        self.base
    }

    /// True while a ramp is still in flight at `time`
    pub fn is_ramping_at(&self, time: f64) -> bool {
        match self.ramp {
            Some(ramp) => time < ramp.end_time,
            None => false,
        }
    }
}
