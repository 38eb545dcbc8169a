use super::scene::SceneBounds;

const SCALING_PER_PAGE: f64 = 0.005;
const DAMPING_PER_PAGE: f64 = 1.0 / 10_000.0;
/// Upper bound on accumulated wheel velocity, keeping the integrator finite.
const MAX_VELOCITY: f32 = 1.0e6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportInput {
    Wheel(f32),
    Press,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub offset: f32,
    pub velocity: f32,
    pub min_offset: f32,
    pub max_offset: f32,
}

/// Inertial horizontal scrolling.
///
/// Wheel impulses accumulate into a velocity that decays exponentially every
/// tick. The offset is always kept within `min_offset..=max_offset`, where the
/// maximum pins the start of the piece to the left edge and the minimum puts
/// the end of the last note on the right edge.
#[derive(Debug, Clone)]
pub struct ViewportPhysics {
    state: ViewportState,
    damping: f32,
    scaling: f32,
    last_wheel: f32,
}

impl ViewportPhysics {
    pub fn new(bounds: &SceneBounds, width: f32) -> Self {
        let pages = bounds.track_pages();
        let min_offset = -(pages as f32 * width - width);
        Self::with_factors(
            min_offset,
            (pages * DAMPING_PER_PAGE) as f32,
            (pages * SCALING_PER_PAGE) as f32,
        )
    }

    pub fn with_factors(min_offset: f32, damping: f32, scaling: f32) -> Self {
        let min_offset = if min_offset.is_finite() { min_offset.min(0.0) } else { 0.0 };
        let damping = if damping.is_finite() { damping.clamp(0.0, 1.0) } else { 1.0 };
        let scaling = if scaling.is_finite() { scaling.max(0.0) } else { 0.0 };
        Self {
            state: ViewportState {
                offset: 0.0,
                velocity: 0.0,
                min_offset,
                max_offset: 0.0,
            },
            damping,
            scaling,
            last_wheel: 0.0,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    pub fn offset(&self) -> f32 {
        self.state.offset
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn scaling(&self) -> f32 {
        self.scaling
    }

    pub fn apply(&mut self, input: ViewportInput) {
        match input {
            ViewportInput::Wheel(impulse) => self.wheel(impulse),
            ViewportInput::Press => self.press(),
        }
    }

    /// Adds a wheel impulse. Reversing direction drops the remaining momentum first.
    pub fn wheel(&mut self, impulse: f32) {
        if impulse == 0.0 || !impulse.is_finite() {
            return;
        }
        if (impulse > 0.0) != (self.last_wheel > 0.0) {
            self.state.velocity = 0.0;
        }
        self.last_wheel = impulse;
        self.state.velocity = (self.state.velocity + impulse).clamp(-MAX_VELOCITY, MAX_VELOCITY);
    }

    pub fn press(&mut self) {
        self.state.velocity = 0.0;
    }

    pub fn step(&mut self) -> f32 {
        let state = &mut self.state;
        state.velocity += (0.0 - state.velocity) * self.damping;
        let offset = state.offset + state.velocity * self.scaling;
        state.offset = offset.clamp(state.min_offset, state.max_offset);
        state.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds(total_duration_ms: f64) -> SceneBounds {
        SceneBounds {
            lowest_pitch: 60,
            highest_pitch: 72,
            total_duration_ms,
            page_window_ms: 1000.0,
        }
    }

    #[test]
    fn test_factors_from_bounds() {
        let physics = ViewportPhysics::new(&bounds(4000.0), 100.0);
        let state = physics.state();
        assert_relative_eq!(state.min_offset, -300.0);
        assert_relative_eq!(state.max_offset, 0.0);
        assert_relative_eq!(physics.scaling(), 0.02);
        assert_relative_eq!(physics.damping(), 0.0004);
    }

    #[test]
    fn test_short_piece_cannot_scroll() {
        let mut physics = ViewportPhysics::new(&bounds(300.0), 100.0);
        assert_eq!(physics.state().min_offset, 0.0);
        physics.wheel(-50.0);
        for _ in 0..100 {
            assert_eq!(physics.step(), 0.0);
        }
    }

    #[test]
    fn test_wheel_scrolls_and_decays() {
        let mut physics = ViewportPhysics::with_factors(-1000.0, 0.5, 1.0);
        physics.wheel(-8.0);
        assert_relative_eq!(physics.step(), -4.0);
        assert_relative_eq!(physics.step(), -6.0);
        assert_relative_eq!(physics.step(), -7.0);
        assert_relative_eq!(physics.state().velocity, -1.0);
    }

    #[test]
    fn test_same_direction_accumulates() {
        let mut physics = ViewportPhysics::with_factors(-1000.0, 0.0, 1.0);
        physics.wheel(-1.0);
        physics.wheel(-2.0);
        assert_relative_eq!(physics.state().velocity, -3.0);
    }

    #[test]
    fn test_direction_reversal_kills_momentum() {
        let mut physics = ViewportPhysics::with_factors(-1000.0, 0.0, 1.0);
        physics.wheel(-5.0);
        physics.wheel(-5.0);
        physics.wheel(2.0);
        assert_relative_eq!(physics.state().velocity, 2.0);
    }

    #[test]
    fn test_press_stops_motion() {
        let mut physics = ViewportPhysics::with_factors(-1000.0, 0.1, 1.0);
        physics.apply(ViewportInput::Wheel(-3.0));
        physics.step();
        physics.apply(ViewportInput::Press);
        let offset = physics.offset();
        assert_eq!(physics.step(), offset);
    }

    #[test]
    fn test_offset_is_clamped() {
        let mut physics = ViewportPhysics::with_factors(-10.0, 0.0, 1.0);
        physics.wheel(-100.0);
        assert_eq!(physics.step(), -10.0);
        physics.wheel(100.0);
        assert_eq!(physics.step(), 0.0);
        physics.wheel(f32::NAN);
        physics.wheel(f32::INFINITY);
        assert_eq!(physics.step(), 0.0);
    }
}
