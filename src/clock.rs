/// Animation time. Only advances while running; never wraps.
#[derive(Default)]
pub struct AnimationClock {
    t: f64,
}

impl AnimationClock {
    pub fn new() -> AnimationClock {
        AnimationClock::default()
    }

    pub fn advance(self: &mut Self, delta: f64, running: bool) {
        if running && delta > 0.0 {
            self.t += delta;
        }
    }

    pub fn time(self: &Self) -> f32 {
        self.t as f32
    }
}

/// Viewer on/off switches, flipped by key presses
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyToggles {
    pub animate: bool,
    pub cull: bool,
    pub wireframe: bool,
}

impl KeyToggles {
    /// Flip the toggle bound to `key`. Returns false for unbound keys.
    pub fn toggle(self: &mut Self, key: char) -> bool {
        let flag = match key {
            ' ' => &mut self.animate,
            'c' => &mut self.cull,
            'z' => &mut self.wireframe,
            _ => return false
        };

        *flag = !*flag;
        true
    }
}
