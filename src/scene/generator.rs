use super::{
    Acorn, AcornOrigin, Burrow, ItemKind, Platform, PowerUp, SceneDescription, SceneId, UidSource,
};
use crate::config::{GameConfig, Season};
use crate::dice::Dice;

pub const TREE_WIDTH: i16 = 120;
pub const TREE_HEIGHT: i16 = 220;
// upper part of the tree where acorns hang
const CANOPY_HEIGHT: i16 = 110;
pub const HOME_TREE_WIDTH: i16 = 160;
pub const HOME_TREE_HEIGHT: i16 = 260;
const HOME_TREE_X: i16 = 40;
pub const BURROW_SIZE: (i16, i16) = (48, 14);
pub const PLATFORM_THICKNESS: i16 = 25;

const TREE_COUNT: (i32, i32) = (1, 6);
const GROUND_ACORN_COUNT: (i32, i32) = (2, 14);
// height of the strip above the floor where loose acorns start
const GROUND_BAND: i16 = 60;
const PLATFORM_COUNT: (i32, i32) = (2, 3);
const PLATFORM_WIDTH: (i16, i16) = (80, 200);
// platform tops, measured upwards from the floor
const PLATFORM_LIFT: (i16, i16) = (70, 150);
const FLOATING_GAP: i16 = 10;

// ┌──────────── Platform bonus roll (1..=100) ────────────┐
// │  1..=15  acorn pile                                   │
// │ 16..=30  coffee                                       │
// │ 31..=45  golden acorn                                 │
// │ 46..=60  two floating acorns                          │
// │ 61..=100 nothing                                      │
// └───────────────────────────────────────────────────────┘
const PILE_BAND: i32 = 15;
const COFFEE_BAND: i32 = 30;
const GOLDEN_BAND: i32 = 45;
const PAIR_BAND: i32 = 60;
const BURROW_CHANCE: i32 = 25;

fn roll<D: Dice + ?Sized>(dice: &mut D, min: i16, max: i16) -> i16 {
    dice.range(min.into(), max.into()) as i16
}

/// Builds scene descriptions. Owns the uid source, so it lives as long as the
/// page does and survives session restarts.
#[derive(Debug)]
pub struct Generator {
    width: i16,
    floor: i16,
    uids: UidSource,
}

impl Generator {
    pub fn new(config: &GameConfig) -> Self {
        Generator {
            width: config.width,
            floor: config.floor(),
            uids: UidSource::default(),
        }
    }

    /// number of uids handed out so far
    pub fn issued(&self) -> u64 {
        self.uids.issued()
    }

    pub fn describe<D: Dice + ?Sized>(
        &mut self,
        id: SceneId,
        season: Season,
        dice: &mut D,
    ) -> SceneDescription {
        match id {
            SceneId::Level(_) => self.generate(season, self.width, dice),
            SceneId::Title => self.title(),
            SceneId::Intro(0) => self.intro_collect(),
            SceneId::Intro(1) => self.intro_deliver(),
            SceneId::Intro(_) => self.intro_burrow(),
            SceneId::Home => self.home(),
        }
    }

    /// Random level: trees with hanging acorns, loose acorns on the ground,
    /// two or three platforms with an optional bonus each, maybe a burrow.
    pub fn generate<D: Dice + ?Sized>(
        &mut self,
        season: Season,
        screen_width: i16,
        dice: &mut D,
    ) -> SceneDescription {
        let mut scene = SceneDescription::default();
        self.plant_trees(&mut scene, season, screen_width, dice);
        self.scatter_ground_acorns(&mut scene, screen_width, dice);
        self.raise_platforms(&mut scene, screen_width, dice);

        if dice.percent(BURROW_CHANCE) {
            scene.burrow = Some(Burrow {
                uid: self.uids.issue(),
                x: roll(dice, 0, screen_width - BURROW_SIZE.0),
            });
        }
        scene
    }

    fn plant_trees<D: Dice + ?Sized>(
        &mut self,
        scene: &mut SceneDescription,
        season: Season,
        screen_width: i16,
        dice: &mut D,
    ) {
        let (acorn_width, acorn_height) = ItemKind::Acorn.size();
        let canopy_top = self.floor - TREE_HEIGHT;
        let canopy_bottom = canopy_top + CANOPY_HEIGHT;
        let (min_acorns, max_acorns) = season.tree_acorn_band();

        let trees = dice.range(TREE_COUNT.0, TREE_COUNT.1);
        for index in 0..trees as usize {
            let x = roll(dice, 0, screen_width - TREE_WIDTH);
            scene.trees.push(x);

            // acorns away from the middle half of the canopy drop to the ground
            let safe_left = x + TREE_WIDTH / 4;
            let safe_right = x + TREE_WIDTH * 3 / 4 - acorn_width;
            for _ in 0..dice.range(min_acorns, max_acorns) {
                let acorn_x = roll(dice, x, x + TREE_WIDTH - acorn_width);
                let acorn_y = roll(dice, canopy_top, canopy_bottom - acorn_height);
                scene.acorns.push(Acorn {
                    uid: self.uids.issue(),
                    x: acorn_x,
                    y: acorn_y,
                    affected_by_gravity: !(safe_left..=safe_right).contains(&acorn_x),
                    origin: AcornOrigin::Tree(index),
                });
            }
        }
    }

    fn scatter_ground_acorns<D: Dice + ?Sized>(
        &mut self,
        scene: &mut SceneDescription,
        screen_width: i16,
        dice: &mut D,
    ) {
        let (acorn_width, acorn_height) = ItemKind::Acorn.size();
        for _ in 0..dice.range(GROUND_ACORN_COUNT.0, GROUND_ACORN_COUNT.1) {
            scene.acorns.push(Acorn {
                uid: self.uids.issue(),
                x: roll(dice, 0, screen_width - acorn_width),
                y: roll(dice, self.floor - GROUND_BAND, self.floor - acorn_height),
                affected_by_gravity: true,
                origin: AcornOrigin::Ground,
            });
        }
    }

    fn raise_platforms<D: Dice + ?Sized>(
        &mut self,
        scene: &mut SceneDescription,
        screen_width: i16,
        dice: &mut D,
    ) {
        for _ in 0..dice.range(PLATFORM_COUNT.0, PLATFORM_COUNT.1) {
            let width = roll(dice, PLATFORM_WIDTH.0, PLATFORM_WIDTH.1.min(screen_width));
            let platform = Platform {
                x: roll(dice, 0, screen_width - width),
                y: self.floor - roll(dice, PLATFORM_LIFT.0, PLATFORM_LIFT.1),
                width,
            };
            scene.platforms.push(platform);

            match dice.range(1, 100) {
                r if r <= PILE_BAND => {
                    let pile = self.place_on(&platform, ItemKind::Pile, dice);
                    scene.piles.push(pile);
                }
                r if r <= COFFEE_BAND => {
                    let coffee = self.place_on(&platform, ItemKind::Coffee, dice);
                    scene.coffee.push(coffee);
                }
                r if r <= GOLDEN_BAND => {
                    let golden = self.place_on(&platform, ItemKind::Golden, dice);
                    scene.golden.push(golden);
                }
                r if r <= PAIR_BAND => {
                    let (acorn_width, acorn_height) = ItemKind::Acorn.size();
                    for _ in 0..2 {
                        scene.acorns.push(Acorn {
                            uid: self.uids.issue(),
                            x: roll(dice, platform.x, platform.x + platform.width - acorn_width),
                            y: platform.y - acorn_height - FLOATING_GAP,
                            affected_by_gravity: false,
                            origin: AcornOrigin::Platform,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn place_on<D: Dice + ?Sized>(
        &mut self,
        platform: &Platform,
        kind: ItemKind,
        dice: &mut D,
    ) -> PowerUp {
        let (item_width, item_height) = kind.size();
        PowerUp {
            uid: self.uids.issue(),
            x: roll(dice, platform.x, platform.x + platform.width - item_width),
            y: platform.y - item_height,
        }
    }

    // ==================== Fixed layouts ====================
    /// stair of four platforms climbing to the right
    fn title(&mut self) -> SceneDescription {
        let platforms = [(200, 50), (300, 125), (400, 200), (500, 275)]
            .iter()
            .map(|&(x, lift)| Platform {
                x,
                y: self.floor - lift - PLATFORM_THICKNESS,
                width: self.width - x,
            })
            .filter(|platform| platform.width > 0)
            .collect();
        SceneDescription {
            platforms,
            ..SceneDescription::default()
        }
    }

    fn intro_collect(&mut self) -> SceneDescription {
        let (_, acorn_height) = ItemKind::Acorn.size();
        let acorns = [1, 2, 3]
            .iter()
            .map(|quarter| Acorn {
                uid: self.uids.issue(),
                x: self.width / 4 * quarter,
                y: self.floor - acorn_height,
                affected_by_gravity: false,
                origin: AcornOrigin::Ground,
            })
            .collect();
        SceneDescription {
            acorns,
            ..SceneDescription::default()
        }
    }

    /// pile first, home tree at the far end
    fn intro_deliver(&mut self) -> SceneDescription {
        let (_, pile_height) = ItemKind::Pile.size();
        SceneDescription {
            piles: vec![PowerUp {
                uid: self.uids.issue(),
                x: self.width / 3,
                y: self.floor - pile_height,
            }],
            home_tree: Some(self.width - HOME_TREE_WIDTH - HOME_TREE_X),
            ..SceneDescription::default()
        }
    }

    fn intro_burrow(&mut self) -> SceneDescription {
        SceneDescription {
            burrow: Some(Burrow {
                uid: self.uids.issue(),
                x: self.width / 2,
            }),
            ..SceneDescription::default()
        }
    }

    /// the home tree, one shade tree and a burrow that is always there
    fn home(&mut self) -> SceneDescription {
        SceneDescription {
            trees: vec![self.width / 2 - TREE_WIDTH / 2],
            burrow: Some(Burrow {
                uid: self.uids.issue(),
                x: self.width - 120,
            }),
            home_tree: Some(HOME_TREE_X),
            ..SceneDescription::default()
        }
    }
}
