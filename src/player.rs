//! Run speed and jump height, derived from the base tuning plus buffs.
//!
//! ┌────────────────────── Derived movement ─────────────────────────┐
//! │ run  = base_run_speed - cheek_debuff(fill) + coffee_buff        │
//! │ jump = base_jump_height * golden_buff                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ acorn          fill + 1 (capped)                                │
//! │ pile           fill = capacity                                  │
//! │ home tree      score += fill, fill = 0                          │
//! │ coffee/golden  needs fill == capacity, fill = 0, buff starts    │
//! └─────────────────────────────────────────────────────────────────┘
use crate::config::PlayerTuning;

const NEUTRAL_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    tuning: PlayerTuning,
    cheek_fill: u32,
    // coffee buff as whole decay steps left, so it lands on exactly zero
    coffee_steps: u32,
    golden_buff: f64,
    score: u32,
    current_run_speed: f64,
    current_jump_height: f64,
}

impl PlayerState {
    pub fn new(tuning: PlayerTuning) -> Self {
        let mut state = PlayerState {
            tuning,
            cheek_fill: 0,
            coffee_steps: 0,
            golden_buff: NEUTRAL_MULTIPLIER,
            score: 0,
            current_run_speed: 0.0,
            current_jump_height: 0.0,
        };
        state.recompute();
        state
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn cheek_fill(&self) -> u32 {
        self.cheek_fill
    }

    pub fn capacity(&self) -> u32 {
        self.tuning.cheek_capacity
    }

    pub fn cheeks_full(&self) -> bool {
        self.cheek_fill >= self.capacity()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_run_speed(&self) -> f64 {
        self.current_run_speed
    }

    pub fn current_jump_height(&self) -> f64 {
        self.current_jump_height
    }

    /// run speed lost to the acorns being carried
    pub fn cheek_debuff(&self) -> f64 {
        let capacity = self.capacity().max(1);
        self.tuning.max_cheek_debuff * f64::from(self.cheek_fill) / f64::from(capacity)
    }

    pub fn coffee_buff(&self) -> f64 {
        (f64::from(self.coffee_steps) * self.tuning.coffee_decay_step).min(self.tuning.coffee_buff)
    }

    pub fn is_coffee_active(&self) -> bool {
        self.coffee_steps > 0
    }

    pub fn golden_buff(&self) -> f64 {
        self.golden_buff
    }

    pub fn is_golden_active(&self) -> bool {
        self.golden_buff != NEUTRAL_MULTIPLIER
    }

    /// Decay ticks from a fresh coffee down to zero.
    pub fn coffee_decay_ticks(&self) -> u32 {
        let ticks = (self.tuning.coffee_buff / self.tuning.coffee_decay_step).round();
        (ticks as u32).max(1)
    }

    // ==================== Cheeks ====================
    pub fn fill_cheeks(&mut self, acorns: u32) {
        self.cheek_fill = self.cheek_fill.saturating_add(acorns).min(self.capacity());
        self.recompute();
    }

    pub fn fill_to_capacity(&mut self) {
        self.cheek_fill = self.capacity();
        self.recompute();
    }

    /// Empty the cheeks into the home tree. Returns the acorns delivered.
    pub fn deliver(&mut self) -> u32 {
        let delivered = self.cheek_fill;
        self.score += delivered;
        self.cheek_fill = 0;
        self.recompute();
        delivered
    }

    /// Pay a full mouth of acorns for coffee or a golden acorn.
    pub fn spend_full_cheeks(&mut self) -> bool {
        if !self.cheeks_full() {
            return false;
        }
        self.cheek_fill = 0;
        self.recompute();
        true
    }

    // ==================== Buffs ====================
    pub fn apply_coffee(&mut self) {
        self.coffee_steps = self.coffee_decay_ticks();
        self.recompute();
    }

    /// One decay tick. Returns `true` while some buff is left.
    pub fn decay_coffee(&mut self) -> bool {
        if self.coffee_steps == 0 {
            return false;
        }
        self.coffee_steps -= 1;
        self.recompute();
        self.coffee_steps > 0
    }

    pub fn apply_golden(&mut self) {
        self.golden_buff = self.tuning.golden_multiplier;
        self.recompute();
    }

    pub fn expire_golden(&mut self) {
        self.golden_buff = NEUTRAL_MULTIPLIER;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.current_run_speed =
            (self.tuning.base_run_speed - self.cheek_debuff() + self.coffee_buff()).max(0.0);
        self.current_jump_height = self.tuning.base_jump_height * self.golden_buff;
    }
}
