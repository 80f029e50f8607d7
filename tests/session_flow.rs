use java_squirrel::config::{GameConfig, Season};
use java_squirrel::engine::stage::Tag;
use java_squirrel::scene::{ItemKind, SceneId};
use java_squirrel::session::{CollisionEvent, InputEvent, Key, Session};

const FRAME_MS: u32 = 20;

fn walk_to(session: &mut Session, x: i16) {
    let floor = session.stage().floor();
    session.stage_mut().player_mut().place_at(x, floor);
    session.update(FRAME_MS);
}

fn press(session: &mut Session, key: Key) {
    session.queue_input(InputEvent::KeyDown(key));
    session.update(FRAME_MS);
}

fn level_with_burrow(level: i32) -> Session {
    for seed in 0..200 {
        let mut session = Session::with_seed(GameConfig::default(), seed);
        session.activate_scene(SceneId::Level(level));
        if session.stage().burrow().is_some() {
            return session;
        }
    }
    panic!("no burrow in level {} for 200 seeds", level);
}

fn burrow_x(session: &Session) -> i16 {
    session
        .stage()
        .burrow()
        .map(|burrow| burrow.rect.left())
        .expect("scene has a burrow")
}

#[test]
fn tutorial_walkthrough_ends_at_home() {
    let mut session = Session::with_seed(GameConfig::default(), 1);
    assert_eq!(session.current_scene(), SceneId::Title);

    press(&mut session, Key::Action);
    assert_eq!(session.current_scene(), SceneId::Intro(0));

    walk_to(&mut session, 170);
    assert_eq!(session.current_scene(), SceneId::Intro(1));
    assert_eq!(session.player().cheek_fill(), 1);

    walk_to(&mut session, 230);
    assert!(session.player().cheeks_full());
    assert_eq!(session.current_scene(), SceneId::Intro(1));

    walk_to(&mut session, 520);
    assert_eq!(session.current_scene(), SceneId::Intro(2));
    assert_eq!(session.player().cheek_fill(), 0);

    let x = burrow_x(&session);
    walk_to(&mut session, x);
    press(&mut session, Key::Action);
    assert!(session.is_input_locked());
    session.update(FRAME_MS);

    assert_eq!(session.current_scene(), SceneId::Home);
    assert!(!session.is_input_locked());
    assert!(session.intro().is_completed());
    assert_eq!(session.player().score(), 0);
    assert_eq!(session.time_left(), Some(180));
    assert_eq!(session.return_to(), None);
}

#[test]
fn burrow_round_trip_returns_to_the_same_level() {
    let mut session = level_with_burrow(3);
    let level_burrow = burrow_x(&session);
    walk_to(&mut session, level_burrow);

    press(&mut session, Key::Action);
    session.update(FRAME_MS);
    assert_eq!(session.current_scene(), SceneId::Home);
    assert_eq!(session.return_to(), Some(SceneId::Level(3)));
    let home_burrow = burrow_x(&session);
    assert_eq!(session.stage().player().rect().left(), home_burrow);

    press(&mut session, Key::Action);
    session.update(FRAME_MS);
    assert_eq!(session.current_scene(), SceneId::Level(3));
    assert_eq!(session.stage().player().rect().left(), level_burrow);
}

#[test]
fn home_burrow_without_a_return_target_leads_to_the_first_level() {
    let mut session = Session::with_seed(GameConfig::default(), 5);
    session.activate_scene(SceneId::Home);
    let x = burrow_x(&session);
    walk_to(&mut session, x);
    press(&mut session, Key::Action);
    session.update(FRAME_MS);
    assert_eq!(session.current_scene(), SceneId::Level(1));
}

#[test]
fn screen_edges_link_home_and_the_levels() {
    let mut session = Session::with_seed(GameConfig::default(), 9);
    session.activate_scene(SceneId::Home);
    walk_to(&mut session, 700 - 32 - 1);

    press(&mut session, Key::Right);
    assert_eq!(session.current_scene(), SceneId::Level(1));
    assert!(session.stage().player().x() < 10.0);

    session.queue_input(InputEvent::KeyUp(Key::Right));
    press(&mut session, Key::Left);
    press(&mut session, Key::Left);
    assert_eq!(session.current_scene(), SceneId::Home);
    assert!(session.stage().player().x() > 600.0);
}

#[test]
fn eaten_acorns_stay_gone_on_revisit() {
    let mut session = Session::with_seed(GameConfig::default(), 21);
    session.activate_scene(SceneId::Level(2));
    let trees = session.registry().get(SceneId::Level(2)).map(|scene| scene.trees.len());
    let before = session
        .registry()
        .get(SceneId::Level(2))
        .map(|scene| scene.pickup_count())
        .unwrap_or_default();

    let (id, uid) = session
        .stage()
        .items()
        .find_map(|entity| match entity.tag {
            Tag::Item {
                uid,
                kind: ItemKind::Acorn,
            } => Some((entity.id, uid)),
            _ => None,
        })
        .expect("generated levels always hold acorns");

    session.queue_collision(CollisionEvent::Overlap(id));
    session.queue_collision(CollisionEvent::Overlap(id));
    session.process_collisions();
    assert_eq!(session.player().cheek_fill(), 1);
    assert!(session.consumed().is_consumed(uid));

    session.activate_scene(SceneId::Home);
    session.activate_scene(SceneId::Level(2));
    let scene = session.registry().get(SceneId::Level(2)).expect("kept");
    assert_eq!(scene.pickup_count(), before - 1);
    assert_eq!(Some(scene.trees.len()), trees);
    assert!(!scene.uids().contains(&uid));
    assert!(session.stage().items().all(|entity| match entity.tag {
        Tag::Item { uid: live, .. } => live != uid,
        _ => true,
    }));
}

#[test]
fn next_season_gets_a_shorter_clock() {
    let mut session = Session::with_seed(GameConfig::default(), 2);
    session.activate_scene(SceneId::Home);
    session.update(180_000);
    assert!(session.is_frozen());

    press(&mut session, Key::Action);
    assert_eq!(session.season(), Season::Summer);
    assert!(session.consumed().is_empty());
    assert_eq!(session.registry().len(), 1);

    session.activate_scene(SceneId::Home);
    assert_eq!(session.time_left(), Some(150));
}

#[test]
fn pause_stops_the_squirrel() {
    let mut session = Session::with_seed(GameConfig::default(), 4);
    session.activate_scene(SceneId::Home);
    press(&mut session, Key::Pause);
    let x = session.stage().player().x();
    press(&mut session, Key::Right);
    session.update(FRAME_MS);
    assert_eq!(session.stage().player().x(), x);
    assert_eq!(session.time_left(), Some(180));

    press(&mut session, Key::Pause);
    press(&mut session, Key::Right);
    assert!(session.stage().player().x() > x);
}
