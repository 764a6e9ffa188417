use std::time::{Duration, Instant};

use crate::geo::LngLat;

/// Easing function for camera transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed interpolation.
    Linear,
    /// Cubic ease-in-out: slow start, fast middle, slow end.
    EaseInOut,
    /// Cubic ease-out: fast start, slow end (deceleration).
    EaseOut,
}

/// Camera position: what the viewer is looking at and how close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub center: LngLat,
    pub zoom: f64,
}

impl CameraPose {
    pub fn new(center: LngLat, zoom: f64) -> Self {
        Self { center, zoom }
    }

    fn lerp(&self, to: &CameraPose, t: f64) -> CameraPose {
        CameraPose {
            center: LngLat::new(
                self.center.lng + (to.center.lng - self.center.lng) * t,
                self.center.lat + (to.center.lat - self.center.lat) * t,
            ),
            zoom: self.zoom + (to.zoom - self.zoom) * t,
        }
    }
}

/// A single in-flight transition.
#[derive(Debug, Clone, Copy)]
struct Flight {
    from: CameraPose,
    to: CameraPose,
    start: Instant,
    duration: Duration,
    easing: Easing,
}

/// Time-driven camera interpolation with last-write-wins retargeting.
///
/// Poses tick on wall-clock `Instant`, so callers pass `now` explicitly and
/// tests can step time deterministically. Starting a new flight while one
/// is in progress launches from wherever the camera currently is; the old
/// target is forgotten.
#[derive(Debug, Clone)]
pub struct CameraAnimator {
    rest: CameraPose,
    flight: Option<Flight>,
}

impl CameraAnimator {
    pub fn new(pose: CameraPose) -> Self {
        Self {
            rest: pose,
            flight: None,
        }
    }

    /// Start (or retarget) a flight to `to`.
    pub fn fly_to(&mut self, to: CameraPose, duration: Duration, easing: Easing, now: Instant) {
        let from = self.pose(now);
        self.flight = Some(Flight {
            from,
            to,
            start: now,
            duration,
            easing,
        });
        self.rest = to;
    }

    /// Jump without animating. Cancels any flight.
    pub fn jump_to(&mut self, pose: CameraPose) {
        self.flight = None;
        self.rest = pose;
    }

    /// Current interpolated pose. Returns the target once complete.
    pub fn pose(&self, now: Instant) -> CameraPose {
        let Some(flight) = &self.flight else {
            return self.rest;
        };
        let elapsed = now.saturating_duration_since(flight.start);
        if flight.duration.is_zero() || elapsed >= flight.duration {
            return flight.to;
        }
        let t = elapsed.as_secs_f32() / flight.duration.as_secs_f32();
        flight.from.lerp(&flight.to, ease(t, flight.easing) as f64)
    }

    /// Where the camera will settle.
    pub fn target(&self) -> CameraPose {
        self.rest
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.flight.as_ref().is_some_and(|f| {
            !f.duration.is_zero() && now.saturating_duration_since(f.start) < f.duration
        })
    }

    /// Forget a finished flight. Call once per frame.
    pub fn gc(&mut self, now: Instant) {
        if self.flight.is_some() && !self.is_active(now) {
            self.flight = None;
        }
    }
}

/// Apply an easing function to a linear progress value `t` in [0, 1].
fn ease(t: f32, easing: Easing) -> f32 {
    match easing {
        Easing::Linear => t,
        Easing::EaseInOut => {
            // Cubic ease-in-out: 4t³ for t<0.5, 1-(-2t+2)³/2 for t>=0.5
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let f = -2.0 * t + 2.0;
                1.0 - f * f * f / 2.0
            }
        }
        Easing::EaseOut => {
            let f = 1.0 - t;
            1.0 - f * f * f
        }
    }
}
