//! Scene descriptions and the registry that keeps them for a session.
//!
//! ┌──────────────────────────── Scene Graph ────────────────────────────┐
//! │ Title ─action─► Intro(0) ─► Intro(1) ─► Intro(2) ─burrow─► Home      │
//! │ Title ─action (tutorial done) ───────────────────────────► Home      │
//! │ Home  ─right─► Level(1) ─right─► Level(2) ─right─► …                 │
//! │ Home  ◄─left── Level(1) ◄─left── Level(2) ◄─left── …                 │
//! │ any other scene ─burrow─► Home ─burrow─► return target               │
//! └──────────────────────────────────────────────────────────────────────┘

use crate::config::Season;
use crate::dice::Dice;
use std::collections::HashMap;
use std::fmt;

pub mod consumed;
pub mod generator;
pub mod render;

pub use consumed::ConsumedSet;
pub use generator::Generator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneId {
    Title,
    Intro(u8),
    Home,
    Level(i32),
}

impl SceneId {
    pub fn is_home(self) -> bool {
        self == SceneId::Home
    }

    pub fn is_intro(self) -> bool {
        matches!(self, SceneId::Intro(_))
    }

    /// scene behind the right screen edge, `None` when the edge is a wall
    pub fn right(self) -> Option<SceneId> {
        match self {
            SceneId::Home => Some(SceneId::Level(1)),
            SceneId::Level(n) => Some(SceneId::Level(n + 1)),
            SceneId::Title | SceneId::Intro(_) => None,
        }
    }

    /// scene behind the left screen edge, `None` when the edge is a wall
    pub fn left(self) -> Option<SceneId> {
        match self {
            SceneId::Level(n) if n <= 1 => Some(SceneId::Home),
            SceneId::Level(n) => Some(SceneId::Level(n - 1)),
            SceneId::Title | SceneId::Intro(_) | SceneId::Home => None,
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneId::Title => write!(f, "title"),
            SceneId::Intro(step) => write!(f, "intro-{}", step),
            SceneId::Home => write!(f, "home"),
            SceneId::Level(n) => write!(f, "level-{}", n),
        }
    }
}

// ==================== Consumables ====================
/// Identity of a single consumable. Issued once, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(u64);

impl Uid {
    pub fn value(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(value: u64) -> Self {
        Uid(value)
    }
}

/// Outlives session restarts so uids stay unique for the whole process.
#[derive(Debug, Default)]
pub struct UidSource {
    next: u64,
}

impl UidSource {
    pub fn issue(&mut self) -> Uid {
        self.next += 1;
        Uid(self.next)
    }

    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Acorn,
    Pile,
    Coffee,
    Golden,
}

impl ItemKind {
    pub fn size(self) -> (i16, i16) {
        match self {
            ItemKind::Acorn => (12, 12),
            ItemKind::Pile => (24, 16),
            ItemKind::Coffee => (14, 20),
            ItemKind::Golden => (16, 16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcornOrigin {
    /// index into `SceneDescription::trees`
    Tree(usize),
    Ground,
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acorn {
    pub uid: Uid,
    pub x: i16,
    pub y: i16,
    pub affected_by_gravity: bool,
    pub origin: AcornOrigin,
}

/// pile, coffee or golden acorn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub uid: Uid,
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burrow {
    pub uid: Uid,
    pub x: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub x: i16,
    /// top edge
    pub y: i16,
    pub width: i16,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    pub trees: Vec<i16>,
    pub platforms: Vec<Platform>,
    pub acorns: Vec<Acorn>,
    pub piles: Vec<PowerUp>,
    pub coffee: Vec<PowerUp>,
    pub golden: Vec<PowerUp>,
    pub burrow: Option<Burrow>,
    pub home_tree: Option<i16>,
}

impl SceneDescription {
    /// every uid the scene still holds, burrow included
    pub fn uids(&self) -> Vec<Uid> {
        self.acorns
            .iter()
            .map(|acorn| acorn.uid)
            .chain(self.piles.iter().map(|item| item.uid))
            .chain(self.coffee.iter().map(|item| item.uid))
            .chain(self.golden.iter().map(|item| item.uid))
            .chain(self.burrow.iter().map(|burrow| burrow.uid))
            .collect()
    }

    pub fn pickup_count(&self) -> usize {
        self.acorns.len() + self.piles.len() + self.coffee.len() + self.golden.len()
    }
}

// ==================== Registry ====================
#[derive(Debug, Default)]
pub struct SceneRegistry {
    scenes: HashMap<SceneId, SceneDescription>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        SceneRegistry::default()
    }

    /// Description for `id`, generated on the first visit and kept afterwards.
    pub fn get_or_create<D: Dice + ?Sized>(
        &mut self,
        id: SceneId,
        season: Season,
        generator: &mut Generator,
        dice: &mut D,
    ) -> &mut SceneDescription {
        self.scenes.entry(id).or_insert_with(|| {
            let description = generator.describe(id, season, dice);
            log::debug!(
                "generated {} for {}: {} trees, {} pickups, burrow {}",
                id,
                season.name(),
                description.trees.len(),
                description.pickup_count(),
                description.burrow.is_some()
            );
            description
        })
    }

    pub fn get(&self, id: SceneId) -> Option<&SceneDescription> {
        self.scenes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn reset(&mut self) {
        self.scenes.clear();
    }
}
