//! One play-through: the scenes visited so far, what was eaten in them, the
//! squirrel's stats and every timer that can still fire.
//!
//! ┌─────────────────────────── Frame order ───────────────────────────┐
//! │ 1. finish last frame's burrow trip, unlock input                  │
//! │ 2. drain queued inputs     pause is always honoured               │
//! │ 3. (not paused, not frozen) move, drop items, cross screen edges  │
//! │ 4. queue overlaps, collect / deliver                              │
//! │ 5. advance timers, ignore firings whose handle is stale           │
//! └───────────────────────────────────────────────────────────────────┘
use crate::config::{GameConfig, Season};
use crate::engine::stage::{EntityId, Stage, Tag, PLAYER_SIZE, PLAYER_START_X};
use crate::intro::{Advance, Intro, Signal};
use crate::player::PlayerState;
use crate::scene::{render, ConsumedSet, Generator, ItemKind, SceneId, SceneRegistry, Uid};
use crate::timer::{TimerHandle, TimerKind, Timers};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use std::collections::VecDeque;

const COUNTDOWN_TICK_MS: u32 = 1_000;
// golden expiry that lands on a paused game looks again after this
const PAUSE_RECHECK_MS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Jump,
    Action,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
}

/// The player touched a live entity this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    Overlap(EntityId),
}

#[derive(Debug, Default, Clone, Copy)]
struct Controls {
    left: bool,
    right: bool,
    jump: bool,
}

impl Controls {
    fn direction(&self) -> i8 {
        self.right as i8 - self.left as i8
    }
}

pub struct Session {
    config: GameConfig,
    season: Season,
    rng: Xoshiro256StarStar,
    generator: Generator,
    registry: SceneRegistry,
    consumed: ConsumedSet,
    player: PlayerState,
    timers: Timers,
    stage: Stage,
    intro: Intro,

    current: SceneId,
    return_to: Option<SceneId>,
    pending_travel: Option<SceneId>,
    input_locked: bool,
    paused: bool,
    frozen: bool,
    controls: Controls,
    inputs: VecDeque<InputEvent>,
    collisions: VecDeque<CollisionEvent>,

    coffee_timer: Option<TimerHandle>,
    golden_timer: Option<TimerHandle>,
    countdown_timer: Option<TimerHandle>,
    time_left: Option<u32>,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Session::with_seed(config, rand::random())
    }

    /// Same seed, same levels.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        let stage = Stage::new(config.width, config.floor());
        let generator = Generator::new(&config);
        let player = PlayerState::new(config.player.clone());
        let mut session = Session {
            season: Season::Spring,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            generator,
            registry: SceneRegistry::new(),
            consumed: ConsumedSet::new(),
            player,
            timers: Timers::new(),
            stage,
            intro: Intro::default(),
            current: SceneId::Title,
            return_to: None,
            pending_travel: None,
            input_locked: false,
            paused: false,
            frozen: false,
            controls: Controls::default(),
            inputs: VecDeque::new(),
            collisions: VecDeque::new(),
            coffee_timer: None,
            golden_timer: None,
            countdown_timer: None,
            time_left: None,
            config,
        };
        session.sync_movement();
        session.activate_scene(SceneId::Title);
        log::info!("session ready, seed {}", seed);
        session
    }

    // ==================== Accessors ====================
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn current_scene(&self) -> SceneId {
        self.current
    }

    /// where the home burrow leads back to
    pub fn return_to(&self) -> Option<SceneId> {
        self.return_to
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn consumed(&self) -> &ConsumedSet {
        &self.consumed
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn intro(&self) -> &Intro {
        &self.intro
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// the countdown ran out; only a restart gets out of here
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    /// seconds on the countdown, `None` before home was first reached
    pub fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    pub fn golden_remaining_ms(&self) -> Option<u32> {
        self.golden_timer
            .and_then(|handle| self.timers.remaining(handle))
    }

    // ==================== Frame ====================
    pub fn queue_input(&mut self, event: InputEvent) {
        self.inputs.push_back(event);
    }

    pub fn queue_collision(&mut self, event: CollisionEvent) {
        self.collisions.push_back(event);
    }

    pub fn update(&mut self, dt_ms: u32) {
        // a trip started last frame lands before this frame's keys are read
        if let Some(destination) = self.pending_travel.take() {
            self.travel(destination);
            self.input_locked = false;
        }

        while let Some(event) = self.inputs.pop_front() {
            self.handle_input(event);
        }

        if !self.paused && !self.frozen {
            self.stage
                .step_player(self.controls.direction(), self.controls.jump);
            self.stage.update();
            self.cross_edges();
            self.detect_overlaps();
            self.process_collisions();
        }

        for (handle, kind) in self.timers.advance(dt_ms) {
            self.fire(handle, kind);
        }
    }

    /// Apply every queued collision in order. An entity that is gone, or a
    /// consumable already eaten, is skipped, so duplicates do nothing.
    pub fn process_collisions(&mut self) {
        while let Some(CollisionEvent::Overlap(id)) = self.collisions.pop_front() {
            let Some(entity) = self.stage.get(id).copied() else {
                continue;
            };
            match entity.tag {
                Tag::Item { uid, kind } => self.collect(id, uid, kind),
                Tag::HomeTree => self.deliver(),
                Tag::Tree | Tag::Platform | Tag::Burrow { .. } => {}
            }
        }
    }

    // ==================== Scenes ====================
    /// Make `id` the live scene: describe it on the first visit, otherwise
    /// re-render what is left of it.
    pub fn activate_scene(&mut self, id: SceneId) {
        self.stage.clear();
        self.collisions.clear();
        let description = self.registry.get_or_create(
            id,
            self.season,
            &mut self.generator,
            &mut self.rng,
        );
        let report = render::render(description, &self.consumed, &mut self.stage);
        self.current = id;
        log::info!(
            "entered {}: {} pickups, {} pruned, burrow {}",
            id,
            report.pickups,
            report.pruned,
            report.burrow
        );

        if id.is_home() && self.time_left.is_none() {
            self.start_countdown();
        }
    }

    /// Back to the title with fresh scenes and stats. The tutorial stays done.
    pub fn restart(&mut self) {
        self.timers.clear();
        self.coffee_timer = None;
        self.golden_timer = None;
        self.countdown_timer = None;
        self.time_left = None;

        self.registry.reset();
        self.consumed.reset();
        self.player = PlayerState::new(self.config.player.clone());

        self.paused = false;
        self.frozen = false;
        self.input_locked = false;
        self.pending_travel = None;
        self.return_to = None;
        self.controls = Controls::default();
        self.inputs.clear();
        self.collisions.clear();

        self.stage.reset_player();
        self.sync_movement();
        self.activate_scene(SceneId::Title);
        log::info!("restarted in {}", self.season.name());
    }

    fn enter(&mut self, id: SceneId) {
        self.activate_scene(id);
        let floor = self.stage.floor();
        self.stage.player_mut().place_at(PLAYER_START_X, floor);
    }

    fn cross_edges(&mut self) {
        let width = f64::from(self.stage.width());
        let player_width = f64::from(PLAYER_SIZE.width);
        let x = self.stage.player().x();

        if x + player_width > width {
            match self.current.right() {
                Some(next) => {
                    self.activate_scene(next);
                    self.stage.player_mut().set_x(0.0);
                }
                None => self.stage.player_mut().clamp_x(0.0, width - player_width),
            }
        } else if x < 0.0 {
            match self.current.left() {
                Some(previous) => {
                    self.activate_scene(previous);
                    self.stage.player_mut().set_x(width - player_width);
                }
                None => self.stage.player_mut().clamp_x(0.0, width - player_width),
            }
        }
    }

    fn detect_overlaps(&mut self) {
        let rect = self.stage.player().rect();
        for (id, tag) in self.stage.overlapping(&rect) {
            if matches!(tag, Tag::Item { .. } | Tag::HomeTree) {
                self.collisions.push_back(CollisionEvent::Overlap(id));
            }
        }
    }

    // ==================== Input ====================
    fn handle_input(&mut self, event: InputEvent) {
        if self.frozen {
            if event == InputEvent::KeyDown(Key::Action) {
                self.season = self.season.next();
                self.restart();
            }
            return;
        }
        if event == InputEvent::KeyDown(Key::Pause) {
            self.paused = !self.paused;
            self.controls = Controls::default();
            log::info!("{}", if self.paused { "paused" } else { "resumed" });
            return;
        }
        if self.paused || self.input_locked {
            return;
        }

        match event {
            InputEvent::KeyDown(Key::Left) => self.controls.left = true,
            InputEvent::KeyUp(Key::Left) => self.controls.left = false,
            InputEvent::KeyDown(Key::Right) => self.controls.right = true,
            InputEvent::KeyUp(Key::Right) => self.controls.right = false,
            InputEvent::KeyDown(Key::Jump) => self.controls.jump = true,
            InputEvent::KeyUp(Key::Jump) => self.controls.jump = false,
            InputEvent::KeyDown(Key::Action) => self.act(),
            InputEvent::KeyUp(Key::Action | Key::Pause) | InputEvent::KeyDown(Key::Pause) => {}
        }
    }

    fn act(&mut self) {
        if self.current == SceneId::Title {
            let entry = self.intro.entry();
            self.enter(entry);
            return;
        }

        let on_burrow = self
            .stage
            .overlapping(&self.stage.player().rect())
            .iter()
            .any(|(_, tag)| matches!(tag, Tag::Burrow { .. }));
        if on_burrow {
            self.begin_travel();
        }
    }

    // ==================== Burrows ====================
    fn begin_travel(&mut self) {
        let destination = if self.current.is_home() {
            self.return_to.unwrap_or(SceneId::Level(1))
        } else {
            if !self.current.is_intro() {
                self.return_to = Some(self.current);
            }
            SceneId::Home
        };
        log::debug!("burrowing from {} to {}", self.current, destination);

        self.input_locked = true;
        self.controls = Controls::default();
        self.pending_travel = Some(destination);
        self.signal(Signal::UsedBurrow);
    }

    fn travel(&mut self, destination: SceneId) {
        self.activate_scene(destination);
        let floor = self.stage.floor();
        let x = self
            .stage
            .burrow()
            .map(|burrow| burrow.rect.left())
            .unwrap_or(PLAYER_START_X);
        self.stage.player_mut().place_at(x, floor);
    }

    // ==================== Pickups ====================
    fn collect(&mut self, id: EntityId, uid: Uid, kind: ItemKind) {
        if self.consumed.is_consumed(uid) {
            return;
        }
        let costs_cheeks = matches!(kind, ItemKind::Coffee | ItemKind::Golden);
        if costs_cheeks && !self.player.cheeks_full() {
            return;
        }

        self.consumed.mark_consumed(uid);
        self.stage.despawn(id);
        match kind {
            ItemKind::Acorn => self.player.fill_cheeks(1),
            ItemKind::Pile => self.player.fill_to_capacity(),
            ItemKind::Coffee => {
                self.player.spend_full_cheeks();
                self.start_coffee();
            }
            ItemKind::Golden => {
                self.player.spend_full_cheeks();
                self.start_golden();
            }
        }
        self.sync_movement();
        log::debug!(
            "ate {:?} {}, cheeks {}/{}",
            kind,
            uid.value(),
            self.player.cheek_fill(),
            self.player.capacity()
        );

        if matches!(kind, ItemKind::Acorn | ItemKind::Pile) {
            self.signal(Signal::CollectedAcorn);
        }
    }

    fn deliver(&mut self) {
        if self.player.cheek_fill() == 0 {
            return;
        }
        let delivered = self.player.deliver();
        self.sync_movement();
        log::info!(
            "stored {} acorns, {} in the tree",
            delivered,
            self.player.score()
        );
        self.signal(Signal::Delivered);
    }

    fn signal(&mut self, signal: Signal) {
        match self.intro.on_signal(self.current, signal) {
            Advance::Next(step) => self.enter(step),
            Advance::Complete => {
                // acorns stored during the tutorial do not count
                self.player = PlayerState::new(self.config.player.clone());
                self.sync_movement();
            }
            Advance::Stay => {}
        }
    }

    // ==================== Buffs ====================
    fn start_coffee(&mut self) {
        if let Some(handle) = self.coffee_timer.take() {
            self.timers.cancel(handle);
        }
        self.player.apply_coffee();
        let interval = self.config.player.coffee_decay_interval_ms;
        self.coffee_timer = Some(
            self.timers
                .schedule_repeating(interval, TimerKind::CoffeeDecay),
        );
    }

    fn start_golden(&mut self) {
        if let Some(handle) = self.golden_timer.take() {
            self.timers.cancel(handle);
        }
        self.player.apply_golden();
        let duration = self.config.player.golden_duration_ms;
        self.golden_timer = Some(self.timers.schedule(duration, TimerKind::GoldenExpiry));
    }

    fn sync_movement(&mut self) {
        let run_speed = self.player.current_run_speed();
        let jump_height = self.player.current_jump_height();
        self.stage.player_mut().set_movement(run_speed, jump_height);
    }

    // ==================== Timers ====================
    fn start_countdown(&mut self) {
        let seconds = self.config.countdown.seconds(self.season);
        self.time_left = Some(seconds);
        self.countdown_timer = Some(
            self.timers
                .schedule_repeating(COUNTDOWN_TICK_MS, TimerKind::CountdownTick),
        );
        log::info!("{} countdown: {}s", self.season.name(), seconds);
    }

    fn fire(&mut self, handle: TimerHandle, kind: TimerKind) {
        match kind {
            TimerKind::CoffeeDecay => {
                if self.coffee_timer != Some(handle) || self.paused {
                    return;
                }
                if !self.player.decay_coffee() {
                    self.timers.cancel(handle);
                    self.coffee_timer = None;
                    log::debug!("coffee wore off");
                }
                self.sync_movement();
            }
            TimerKind::GoldenExpiry => {
                if self.golden_timer != Some(handle) {
                    return;
                }
                if self.paused {
                    self.golden_timer =
                        Some(self.timers.schedule(PAUSE_RECHECK_MS, TimerKind::GoldenExpiry));
                    return;
                }
                self.golden_timer = None;
                self.player.expire_golden();
                self.sync_movement();
                log::debug!("golden acorn wore off");
            }
            TimerKind::CountdownTick => {
                if self.countdown_timer != Some(handle) || self.paused || self.frozen {
                    return;
                }
                let left = self.time_left.unwrap_or(0).saturating_sub(1);
                self.time_left = Some(left);
                if left == 0 {
                    self.time_up();
                }
            }
        }
    }

    fn time_up(&mut self) {
        self.frozen = true;
        self.controls = Controls::default();
        if let Some(handle) = self.countdown_timer.take() {
            self.timers.cancel(handle);
        }
        log::info!(
            "{} is over: {} acorns stored",
            self.season.name(),
            self.player.score()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Rect;
    use approx::assert_relative_eq;

    fn session() -> Session {
        Session::with_seed(GameConfig::default(), 7)
    }

    fn spawn_item(session: &mut Session, raw_uid: u64, kind: ItemKind) -> EntityId {
        session.stage.spawn(
            Tag::Item {
                uid: Uid::from_raw(raw_uid),
                kind,
            },
            Rect::from_xywh(600, 0, 10, 10),
            false,
        )
    }

    fn drink_coffee(session: &mut Session) {
        session.player.fill_to_capacity();
        let id = spawn_item(session, 9_001, ItemKind::Coffee);
        session.queue_collision(CollisionEvent::Overlap(id));
        session.process_collisions();
    }

    #[test]
    fn coffee_needs_full_cheeks() {
        let mut session = session();
        session.player.fill_cheeks(3);
        let id = spawn_item(&mut session, 9_001, ItemKind::Coffee);
        session.queue_collision(CollisionEvent::Overlap(id));
        session.process_collisions();

        assert!(!session.player().is_coffee_active());
        assert!(session.stage().get(id).is_some());
        assert!(!session.consumed().is_consumed(Uid::from_raw(9_001)));
    }

    #[test]
    fn coffee_decays_away_and_its_timer_stops() {
        let mut session = session();
        drink_coffee(&mut session);
        assert_eq!(session.player().cheek_fill(), 0);
        assert_relative_eq!(session.stage().player().run_speed(), 4.0);

        for _ in 0..20 {
            session.update(500);
        }
        assert!(!session.player().is_coffee_active());
        assert!(session.coffee_timer.is_none());
        assert!(session.timers().is_empty());
        assert_relative_eq!(session.stage().player().run_speed(), 2.0);
    }

    #[test]
    fn paused_coffee_does_not_decay() {
        let mut session = session();
        drink_coffee(&mut session);
        session.queue_input(InputEvent::KeyDown(Key::Pause));
        for _ in 0..5 {
            session.update(500);
        }
        assert!(session.is_paused());
        assert_relative_eq!(session.player().coffee_buff(), 2.0);

        session.queue_input(InputEvent::KeyDown(Key::Pause));
        session.update(500);
        assert_relative_eq!(session.player().coffee_buff(), 1.9);
    }

    #[test]
    fn golden_expiry_waits_for_unpause() {
        let mut session = session();
        session.player.fill_to_capacity();
        let id = spawn_item(&mut session, 9_002, ItemKind::Golden);
        session.queue_collision(CollisionEvent::Overlap(id));
        session.process_collisions();
        assert_relative_eq!(session.stage().player().jump_height(), 8.0);

        session.queue_input(InputEvent::KeyDown(Key::Pause));
        session.update(10_000);
        assert!(session.player().is_golden_active());

        session.queue_input(InputEvent::KeyDown(Key::Pause));
        session.update(PAUSE_RECHECK_MS);
        assert!(!session.player().is_golden_active());
        assert_relative_eq!(session.stage().player().jump_height(), 4.0);
    }

    #[test]
    fn second_coffee_replaces_the_first_timer() {
        let mut session = session();
        drink_coffee(&mut session);
        let first = session.coffee_timer;
        session.update(1_000);

        session.player.fill_to_capacity();
        let id = spawn_item(&mut session, 9_003, ItemKind::Coffee);
        session.queue_collision(CollisionEvent::Overlap(id));
        session.process_collisions();

        assert_ne!(session.coffee_timer, first);
        assert_eq!(session.timers().len(), 1);
        assert_relative_eq!(session.player().coffee_buff(), 2.0);
    }

    #[test]
    fn restart_cancels_every_timer() {
        let mut session = session();
        drink_coffee(&mut session);
        session.player.fill_to_capacity();
        let golden = spawn_item(&mut session, 9_005, ItemKind::Golden);
        session.queue_collision(CollisionEvent::Overlap(golden));
        session.process_collisions();
        assert!(session.golden_remaining_ms().is_some());
        session.activate_scene(SceneId::Home);
        assert!(session.time_left().is_some());

        session.restart();
        assert!(session.timers().is_empty());
        assert_eq!(session.time_left(), None);
        assert_eq!(session.golden_remaining_ms(), None);
        assert_eq!(session.current_scene(), SceneId::Title);
        assert!(!session.player().is_coffee_active());
        assert!(!session.player().is_golden_active());

        let golden_duration = session.config().player.golden_duration_ms;
        session.update(golden_duration);
        assert_relative_eq!(session.stage().player().jump_height(), 4.0);
        session.update(60_000);
        assert_relative_eq!(session.stage().player().run_speed(), 2.0);
        assert_relative_eq!(session.stage().player().jump_height(), 4.0);
    }

    #[test]
    fn burrow_trip_lands_on_the_next_frame() {
        let mut session = session();
        session.activate_scene(SceneId::Level(1));
        let floor = session.stage.floor();
        let uid = Uid::from_raw(9_006);
        session.stage.spawn(
            Tag::Burrow { uid },
            Rect::from_xywh(300, floor - 14, 48, 14),
            false,
        );
        session.stage.player_mut().place_at(300, floor);

        session.queue_input(InputEvent::KeyDown(Key::Action));
        session.update(20);
        assert_eq!(session.current_scene(), SceneId::Level(1));
        assert!(session.is_input_locked());

        session.queue_input(InputEvent::KeyDown(Key::Right));
        session.update(20);
        assert_eq!(session.current_scene(), SceneId::Home);
        assert!(!session.is_input_locked());
        assert_eq!(session.return_to(), Some(SceneId::Level(1)));
    }

    #[test]
    fn countdown_expiry_freezes_until_restart() {
        let mut session = session();
        session.activate_scene(SceneId::Home);
        assert_eq!(session.time_left(), Some(180));

        session.update(179_000);
        assert_eq!(session.time_left(), Some(1));
        assert!(!session.is_frozen());
        session.update(1_000);
        assert_eq!(session.time_left(), Some(0));
        assert!(session.is_frozen());

        let x = session.stage().player().x();
        session.queue_input(InputEvent::KeyDown(Key::Right));
        session.update(20);
        assert_relative_eq!(session.stage().player().x(), x);

        session.queue_input(InputEvent::KeyDown(Key::Action));
        session.update(20);
        assert!(!session.is_frozen());
        assert_eq!(session.season(), Season::Summer);
        assert_eq!(session.current_scene(), SceneId::Title);
    }

    #[test]
    fn paused_countdown_holds() {
        let mut session = session();
        session.activate_scene(SceneId::Home);
        session.queue_input(InputEvent::KeyDown(Key::Pause));
        session.update(30_000);
        assert_eq!(session.time_left(), Some(180));
    }

    #[test]
    fn duplicate_overlaps_collect_once() {
        let mut session = session();
        let id = spawn_item(&mut session, 9_004, ItemKind::Acorn);
        for _ in 0..3 {
            session.queue_collision(CollisionEvent::Overlap(id));
        }
        session.process_collisions();
        assert_eq!(session.player().cheek_fill(), 1);
        assert_eq!(session.consumed().len(), 1);
    }

    #[test]
    fn walls_hold_the_player_in_the_title() {
        let mut session = session();
        session.stage.player_mut().set_movement(2.0, 4.0);
        session.stage.player_mut().set_x(1.0);
        session.queue_input(InputEvent::KeyDown(Key::Left));
        session.update(20);
        session.update(20);
        assert_eq!(session.current_scene(), SceneId::Title);
        assert_relative_eq!(session.stage().player().x(), 0.0);
    }
}
