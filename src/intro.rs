use crate::scene::SceneId;

/// Gameplay moments the tutorial listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    CollectedAcorn,
    Delivered,
    UsedBurrow,
}

pub const LAST_STEP: u8 = 2;

/// What happens after a signal arrives in an introduction scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Stay,
    Next(SceneId),
    /// the last lesson is done; the burrow itself carries the player home
    Complete,
}

/// signal that finishes each step
pub fn objective(step: u8) -> Signal {
    match step {
        0 => Signal::CollectedAcorn,
        1 => Signal::Delivered,
        _ => Signal::UsedBurrow,
    }
}

pub fn instructions(step: u8) -> &'static str {
    match step {
        0 => "Run with the arrow keys and grab an acorn.",
        1 => "Fill your cheeks at the pile, then empty them into the home tree.",
        _ => "Stand on the burrow and press E to travel home.",
    }
}

#[derive(Debug, Default)]
pub struct Intro {
    completed: bool,
}

impl Intro {
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// where a fresh start from the title goes
    pub fn entry(&self) -> SceneId {
        if self.completed {
            SceneId::Home
        } else {
            SceneId::Intro(0)
        }
    }

    pub fn on_signal(&mut self, scene: SceneId, signal: Signal) -> Advance {
        let SceneId::Intro(step) = scene else {
            return Advance::Stay;
        };
        if objective(step) != signal {
            return Advance::Stay;
        }
        if step >= LAST_STEP {
            self.completed = true;
            log::info!("introduction completed");
            Advance::Complete
        } else {
            Advance::Next(SceneId::Intro(step + 1))
        }
    }
}
