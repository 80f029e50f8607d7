//! Live entities of the active scene and the player's movement component.
use super::{Point, Rect, Size};
use crate::scene::{ItemKind, Uid};

// physics consts, per frame
const GRAVITY: f64 = 1.0;
// jump height 4 launches at 16px per frame
const JUMP_IMPULSE: f64 = 4.0;
const FALL_SPEED: i16 = 4;

pub const PLAYER_SIZE: Size = Size {
    width: 32,
    height: 26,
};
pub const PLAYER_START_X: i16 = 32;

pub type EntityId = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Tree,
    HomeTree,
    Platform,
    Item { uid: Uid, kind: ItemKind },
    Burrow { uid: Uid },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entity {
    pub id: EntityId,
    pub tag: Tag,
    pub rect: Rect,
    /// drops until it rests on the floor
    pub falls: bool,
}

/// Two-way movement: run left/right, jump when standing on something.
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    x: f64,
    y: f64,
    velocity_y: f64,
    run_speed: f64,
    jump_height: f64,
    grounded: bool,
}

impl Mover {
    fn new(floor: i16) -> Self {
        Mover {
            x: PLAYER_START_X.into(),
            y: f64::from(floor - PLAYER_SIZE.height),
            velocity_y: 0.0,
            run_speed: 0.0,
            jump_height: 0.0,
            grounded: true,
        }
    }

    pub fn set_movement(&mut self, run_speed: f64, jump_height: f64) {
        self.run_speed = run_speed;
        self.jump_height = jump_height;
    }

    pub fn run_speed(&self) -> f64 {
        self.run_speed
    }

    pub fn jump_height(&self) -> f64 {
        self.jump_height
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn place_at(&mut self, x: i16, floor: i16) {
        self.x = x.into();
        self.y = f64::from(floor - PLAYER_SIZE.height);
        self.velocity_y = 0.0;
        self.grounded = true;
    }

    /// keeps height and vertical speed, for walking off a screen edge
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn clamp_x(&mut self, min: f64, max: f64) {
        self.x = self.x.clamp(min, max);
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            Point {
                x: self.x.round() as i16,
                y: self.y.round() as i16,
            },
            PLAYER_SIZE,
        )
    }

    /// `direction` is -1 (left), 0 or 1 (right)
    fn step(&mut self, direction: i8, jump: bool, platforms: &[Rect], floor: i16) {
        self.x += f64::from(direction) * self.run_speed;

        if jump && self.grounded {
            self.velocity_y = -self.jump_height * JUMP_IMPULSE;
            self.grounded = false;
        }

        let height = f64::from(PLAYER_SIZE.height);
        let previous_bottom = self.y + height;
        self.velocity_y += GRAVITY;
        self.y += self.velocity_y;
        self.grounded = false;

        // land on platform tops only when falling through them from above
        if self.velocity_y >= 0.0 {
            let left = self.x;
            let right = self.x + f64::from(PLAYER_SIZE.width);
            for platform in platforms {
                let top = f64::from(platform.top());
                let spans = left < f64::from(platform.right()) && right > f64::from(platform.left());
                if spans && previous_bottom <= top && self.y + height >= top {
                    self.y = top - height;
                    self.velocity_y = 0.0;
                    self.grounded = true;
                }
            }
        }

        let floor = f64::from(floor);
        if self.y + height >= floor {
            self.y = floor - height;
            self.velocity_y = 0.0;
            self.grounded = true;
        }
    }
}

/// Everything spawned for the active scene. Entity ids are never reused, so a
/// queued collision for a despawned entity simply finds nothing.
#[derive(Debug)]
pub struct Stage {
    width: i16,
    floor: i16,
    next_id: EntityId,
    entities: Vec<Entity>,
    player: Mover,
}

impl Stage {
    pub fn new(width: i16, floor: i16) -> Self {
        Stage {
            width,
            floor,
            next_id: 0,
            entities: Vec::new(),
            player: Mover::new(floor),
        }
    }

    pub fn width(&self) -> i16 {
        self.width
    }

    pub fn floor(&self) -> i16 {
        self.floor
    }

    pub fn spawn(&mut self, tag: Tag, rect: Rect, falls: bool) -> EntityId {
        self.next_id += 1;
        let id = self.next_id;
        self.entities.push(Entity {
            id,
            tag,
            rect,
            falls,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.id != id);
        self.entities.len() != before
    }

    /// drop every scene entity; the player persists
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn items(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|entity| matches!(entity.tag, Tag::Item { .. }))
    }

    pub fn burrow(&self) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| matches!(entity.tag, Tag::Burrow { .. }))
    }

    pub fn player(&self) -> &Mover {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Mover {
        &mut self.player
    }

    pub fn reset_player(&mut self) {
        self.player = Mover::new(self.floor);
    }

    /// collision port: entities whose rect intersects `rect`, in spawn order
    pub fn overlapping(&self, rect: &Rect) -> Vec<(EntityId, Tag)> {
        self.entities
            .iter()
            .filter(|entity| entity.rect.intersects(rect))
            .map(|entity| (entity.id, entity.tag))
            .collect()
    }

    pub fn step_player(&mut self, direction: i8, jump: bool) {
        let platforms: Vec<Rect> = self
            .entities
            .iter()
            .filter(|entity| entity.tag == Tag::Platform)
            .map(|entity| entity.rect)
            .collect();
        self.player.step(direction, jump, &platforms, self.floor);
    }

    /// falling entities drop towards the floor
    pub fn update(&mut self) {
        let floor = self.floor;
        for entity in self.entities.iter_mut().filter(|entity| entity.falls) {
            let bottom = entity.rect.bottom();
            if bottom < floor {
                entity.rect.position.y += FALL_SPEED.min(floor - bottom);
            }
        }
    }
}
