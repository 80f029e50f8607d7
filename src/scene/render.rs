use super::generator::{
    BURROW_SIZE, HOME_TREE_HEIGHT, HOME_TREE_WIDTH, PLATFORM_THICKNESS, TREE_HEIGHT, TREE_WIDTH,
};
use super::{ConsumedSet, ItemKind, PowerUp, SceneDescription};
use crate::engine::stage::{Stage, Tag};
use crate::engine::Rect;

/// What a render put on the stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    /// trees, platforms and the home tree
    pub scenery: usize,
    pub pickups: usize,
    pub burrow: bool,
    /// entries dropped from the description because they were consumed
    pub pruned: usize,
}

/// Spawn a scene's entities onto `stage`.
///
/// Scenery is rebuilt every time. Consumables already in `consumed` are left
/// out and removed from `description`, so a scene only ever shrinks.
pub fn render(
    description: &mut SceneDescription,
    consumed: &ConsumedSet,
    stage: &mut Stage,
) -> RenderReport {
    let floor = stage.floor();
    let mut report = RenderReport::default();

    for x in &description.trees {
        stage.spawn(
            Tag::Tree,
            Rect::from_xywh(*x, floor - TREE_HEIGHT, TREE_WIDTH, TREE_HEIGHT),
            false,
        );
        report.scenery += 1;
    }
    for platform in &description.platforms {
        stage.spawn(
            Tag::Platform,
            Rect::from_xywh(platform.x, platform.y, platform.width, PLATFORM_THICKNESS),
            false,
        );
        report.scenery += 1;
    }
    if let Some(x) = description.home_tree {
        stage.spawn(
            Tag::HomeTree,
            Rect::from_xywh(x, floor - HOME_TREE_HEIGHT, HOME_TREE_WIDTH, HOME_TREE_HEIGHT),
            false,
        );
        report.scenery += 1;
    }

    let before = description.acorns.len();
    description.acorns.retain(|acorn| !consumed.is_consumed(acorn.uid));
    report.pruned += before - description.acorns.len();
    let (width, height) = ItemKind::Acorn.size();
    for acorn in &description.acorns {
        stage.spawn(
            Tag::Item {
                uid: acorn.uid,
                kind: ItemKind::Acorn,
            },
            Rect::from_xywh(acorn.x, acorn.y, width, height),
            acorn.affected_by_gravity,
        );
        report.pickups += 1;
    }

    for (items, kind) in [
        (&mut description.piles, ItemKind::Pile),
        (&mut description.coffee, ItemKind::Coffee),
        (&mut description.golden, ItemKind::Golden),
    ] {
        report.pruned += prune(items, consumed);
        report.pickups += spawn_power_ups(items, kind, stage);
    }

    match description.burrow {
        Some(burrow) if consumed.is_consumed(burrow.uid) => {
            description.burrow = None;
            report.pruned += 1;
        }
        Some(burrow) => {
            stage.spawn(
                Tag::Burrow { uid: burrow.uid },
                Rect::from_xywh(burrow.x, floor - BURROW_SIZE.1, BURROW_SIZE.0, BURROW_SIZE.1),
                false,
            );
            report.burrow = true;
        }
        None => {}
    }

    report
}

fn prune(items: &mut Vec<PowerUp>, consumed: &ConsumedSet) -> usize {
    let before = items.len();
    items.retain(|item| !consumed.is_consumed(item.uid));
    before - items.len()
}

fn spawn_power_ups(items: &[PowerUp], kind: ItemKind, stage: &mut Stage) -> usize {
    let (width, height) = kind.size();
    for item in items {
        stage.spawn(
            Tag::Item { uid: item.uid, kind },
            Rect::from_xywh(item.x, item.y, width, height),
            false,
        );
    }
    items.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, Season};
    use crate::scene::Generator;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn level(seed: u64) -> SceneDescription {
        let config = GameConfig::default();
        let mut generator = Generator::new(&config);
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        generator.generate(Season::Spring, config.width, &mut rng)
    }

    fn live_items(stage: &Stage) -> Vec<(Tag, Rect)> {
        stage.items().map(|entity| (entity.tag, entity.rect)).collect()
    }

    #[test]
    fn rerender_without_consumption_is_identical() {
        let mut description = level(11);
        let consumed = ConsumedSet::new();
        let mut stage = Stage::new(700, 370);

        let first = render(&mut description, &consumed, &mut stage);
        let first_items = live_items(&stage);
        stage.clear();
        let second = render(&mut description, &consumed, &mut stage);

        assert_eq!(first, second);
        assert_eq!(first_items, live_items(&stage));
        assert_eq!(first.pruned, 0);
    }

    #[test]
    fn consumed_items_are_pruned_and_not_spawned() {
        let mut description = level(12);
        let mut consumed = ConsumedSet::new();
        let victim = description.acorns[0].uid;
        consumed.mark_consumed(victim);
        let mut stage = Stage::new(700, 370);

        let report = render(&mut description, &consumed, &mut stage);
        assert_eq!(report.pruned, 1);
        assert!(description.acorns.iter().all(|acorn| acorn.uid != victim));
        assert!(stage.items().all(|entity| entity.tag
            != Tag::Item {
                uid: victim,
                kind: ItemKind::Acorn
            }));
    }

    #[test]
    fn fully_consumed_scene_keeps_only_scenery() {
        let mut description = level(13);
        let mut consumed = ConsumedSet::new();
        for uid in description.uids() {
            consumed.mark_consumed(uid);
        }
        let trees = description.trees.len();
        let mut stage = Stage::new(700, 370);

        let report = render(&mut description, &consumed, &mut stage);
        assert_eq!(report.pickups, 0);
        assert!(!report.burrow);
        assert_eq!(stage.items().count(), 0);
        assert_eq!(description.pickup_count(), 0);
        assert!(description.burrow.is_none());
        assert_eq!(
            stage.entities().iter().filter(|entity| entity.tag == Tag::Tree).count(),
            trees
        );
    }

    #[test]
    fn gravity_flag_becomes_falling_entity() {
        let mut description = level(14);
        let consumed = ConsumedSet::new();
        let mut stage = Stage::new(700, 370);
        render(&mut description, &consumed, &mut stage);

        for acorn in &description.acorns {
            let entity = stage
                .items()
                .find(|entity| matches!(entity.tag, Tag::Item { uid, .. } if uid == acorn.uid))
                .expect("acorn should be on stage");
            assert_eq!(entity.falls, acorn.affected_by_gravity);
        }
    }
}
