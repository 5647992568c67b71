//! Hold-to-confirm debouncing.
//!
//! A [`HoldTimer`] turns a per-frame boolean into a single fire-once signal
//! once the boolean has stayed true for the configured duration. Timers are
//! purely logical: they only advance when [`HoldTimer::update`] is called with
//! a fresh clock reading, so all state changes happen on the frame path.

/// Hold timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldState {
    #[default]
    Idle,
    Holding { started_at_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct HoldTimer {
    name: &'static str,
    duration_ms: u64,
    state: HoldState,
}

impl HoldTimer {
    pub fn new(name: &'static str, duration_ms: u64) -> Self {
        Self {
            name,
            duration_ms,
            state: HoldState::Idle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, HoldState::Holding { .. })
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            HoldState::Idle => None,
            HoldState::Holding { started_at_ms } => Some(now_ms.saturating_sub(started_at_ms)),
        }
    }

    /// Fraction of the hold completed, for progress indicators
    pub fn progress(&self, now_ms: u64) -> f32 {
        match self.elapsed_ms(now_ms) {
            None => 0.0,
            Some(_) if self.duration_ms == 0 => 1.0,
            Some(elapsed) => (elapsed as f32 / self.duration_ms as f32).min(1.0),
        }
    }

    /// Advance with this frame's reading of the pose; returns true exactly
    /// once per completed hold
    ///
    /// The frame on which the pose first becomes true only starts the hold,
    /// so even a zero duration fires on the following frame at the earliest.
    pub fn update(&mut self, active: bool, now_ms: u64) -> bool {
        if !active {
            self.cancel();
            return false;
        }

        match self.state {
            HoldState::Idle => {
                log::debug!("{} hold started, confirming in {}ms", self.name, self.duration_ms);
                self.state = HoldState::Holding {
                    started_at_ms: now_ms,
                };
                false
            }
            HoldState::Holding { started_at_ms } => {
                if now_ms.saturating_sub(started_at_ms) >= self.duration_ms {
                    log::debug!("{} hold confirmed", self.name);
                    self.state = HoldState::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Drop back to idle without firing
    pub fn cancel(&mut self) {
        if self.is_holding() {
            log::trace!("{} hold cancelled", self.name);
        }
        self.state = HoldState::Idle;
    }
}
