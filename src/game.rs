use crate::config::GameConfig;
use crate::engine::input::{KeyPress, KeyState};
use crate::engine::stage::Tag;
use crate::engine::{self, Game, Point, Rect, Renderer, FRAME_SIZE};
use crate::hud::{BrowserHud, Hud, HudFrame};
use crate::scene::ItemKind;
use crate::session::{InputEvent, Key, Session};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::join;
use web_sys::HtmlImageElement;

/// TABLE
/// ┌───────────────────────── Frame Flow ─────────────────────────┐
/// │                                                              │
/// │  GameLoop ──keystate──► JavaSquirrel::update                 │
/// │                          ├─► key codes → session inputs      │
/// │                          ├─► Session::update(frame ms)       │
/// │                          └─► Hud changed writes → page       │
/// │                                                              │
/// │  GameLoop ──renderer──► JavaSquirrel::draw                   │
/// │                          └─► background, scenery, squirrel   │
/// │                                                              │
/// └──────────────────────────────────────────────────────────────┘
pub enum JavaSquirrel {
    /// config and images still loading
    Loading,
    Loaded(Box<Squirrel>),
}

impl JavaSquirrel {
    const BACKGROUND_PATH: &'static str = "image/background.png";

    pub fn new() -> Self {
        JavaSquirrel::Loading
    }

    async fn load_background() -> Result<HtmlImageElement> {
        engine::load_image(Self::BACKGROUND_PATH)
            .await
            .with_context(|| format!("Failed to load background from : {}", Self::BACKGROUND_PATH))
    }
}

#[async_trait(?Send)]
impl Game for JavaSquirrel {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            JavaSquirrel::Loading => {
                let (config, background) = join!(GameConfig::load(), Self::load_background());
                let squirrel = Squirrel {
                    session: Session::new(config),
                    background: background?,
                    hud: Hud::new(),
                    page: BrowserHud,
                };
                Ok(Box::new(JavaSquirrel::Loaded(Box::new(squirrel))))
            }
            JavaSquirrel::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let JavaSquirrel::Loaded(squirrel) = self {
            for press in keystate.presses() {
                if let Some(event) = input_event(press) {
                    squirrel.session.queue_input(event);
                }
            }
            squirrel.session.update(FRAME_SIZE as u32);

            let frame = HudFrame::capture(&squirrel.session);
            if let Err(err) = squirrel.hud.apply(&frame, &mut squirrel.page) {
                log::error!("{:#}", err);
            }
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let JavaSquirrel::Loaded(squirrel) = self {
            let stage = squirrel.session.stage();
            let config = squirrel.session.config();
            renderer.clear(&Rect::from_xywh(0, 0, config.width, config.height));
            renderer.draw_image(&squirrel.background, &Point { x: 0, y: 0 });
            renderer.fill_rect(
                &Rect::from_xywh(0, config.floor(), config.width, config.floor_height),
                "#6b4f2a",
            );

            // draw order matters : scenery -> pickups -> squirrel
            let mut entities: Vec<_> = stage.entities().iter().collect();
            entities.sort_by_key(|entity| layer(&entity.tag));
            for entity in entities {
                renderer.fill_rect(&entity.rect, color(&entity.tag));
            }
            renderer.fill_rect(&stage.player().rect(), "#b5651d");
        }
    }
}

pub struct Squirrel {
    session: Session,
    background: HtmlImageElement,
    hud: Hud,
    page: BrowserHud,
}

/// Browser key code to game key, `None` for keys the game ignores
fn key(code: &str) -> Option<Key> {
    match code {
        "ArrowLeft" | "KeyA" => Some(Key::Left),
        "ArrowRight" | "KeyD" => Some(Key::Right),
        "ArrowUp" | "KeyW" | "Space" => Some(Key::Jump),
        "KeyE" | "Enter" => Some(Key::Action),
        "KeyP" | "Escape" => Some(Key::Pause),
        _ => None,
    }
}

fn input_event(press: &KeyPress) -> Option<InputEvent> {
    match press {
        KeyPress::KeyDown(code) => key(code).map(InputEvent::KeyDown),
        KeyPress::KeyUp(code) => key(code).map(InputEvent::KeyUp),
    }
}

fn layer(tag: &Tag) -> u8 {
    match tag {
        Tag::Tree | Tag::HomeTree => 0,
        Tag::Platform | Tag::Burrow { .. } => 1,
        Tag::Item { .. } => 2,
    }
}

fn color(tag: &Tag) -> &'static str {
    match tag {
        Tag::Tree => "#2e7d32",
        Tag::HomeTree => "#1b5e20",
        Tag::Platform => "#795548",
        Tag::Burrow { .. } => "#3e2723",
        Tag::Item { kind, .. } => match kind {
            ItemKind::Acorn => "#a0522d",
            ItemKind::Pile => "#8b4513",
            ItemKind::Coffee => "#4e342e",
            ItemKind::Golden => "#ffd700",
        },
    }
}
