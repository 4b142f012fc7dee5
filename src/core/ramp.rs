/// Mirror of one linearly automated parameter (gain, frequency, detune).
///
/// Only the latest ramp is kept: a new ramp starts from whatever value the previous
/// one had reached at "now" and replaces its end point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamTimeline {
    from: f32,
    to: f32,
    start: f64,
    end: f64,
}

impl ParamTimeline {
    pub fn new(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            end: 0.0,
        }
    }

    pub fn value_at(&self, t: f64) -> f32 {
        if t >= self.end {
            return self.to;
        }
        if t <= self.start {
            return self.from;
        }
        let frac = ((t - self.start) / (self.end - self.start)) as f32;
        self.from + (self.to - self.from) * frac
    }

    /// Schedule a ramp from the value held at `now` to `target` at `end`.
    /// Returns the held value so callers can pin the real parameter to it.
    pub fn ramp_to(&mut self, now: f64, target: f32, end: f64) -> f32 {
        let held = self.value_at(now);
        *self = Self {
            from: held,
            to: target,
            start: now,
            end: end.max(now),
        };
        held
    }

    pub fn set(&mut self, now: f64, value: f32) {
        *self = Self {
            from: value,
            to: value,
            start: now,
            end: now,
        };
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn end_time(&self) -> f64 {
        self.end
    }

    #[inline]
    pub fn is_settled(&self, t: f64) -> bool {
        t >= self.end
    }
}
