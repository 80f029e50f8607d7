//! The HTML overlay on top of the canvas: score, clock, cheek and buff bars.
//!
//! A `HudFrame` is captured from the session after every update. `Hud`
//! remembers what the page shows and only writes what changed.
use crate::browser;
use crate::intro;
use crate::scene::SceneId;
use crate::session::Session;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::mem::{self, Discriminant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    Score,
    Clock,
    Season,
    CheekBar,
    CoffeeBar,
    GoldenBar,
    Hint,
    PauseBanner,
    Summary,
}

impl Widget {
    pub fn element_id(self) -> &'static str {
        match self {
            Widget::Score => "hud-score",
            Widget::Clock => "hud-clock",
            Widget::Season => "hud-season",
            Widget::CheekBar => "hud-cheeks",
            Widget::CoffeeBar => "hud-coffee",
            Widget::GoldenBar => "hud-golden",
            Widget::Hint => "hud-hint",
            Widget::PauseBanner => "hud-paused",
            Widget::Summary => "hud-summary",
        }
    }
}

/// Where HUD writes go. The page in the browser, a recorder in tests.
pub trait HudSink {
    fn set_text(&mut self, widget: Widget, text: &str) -> Result<()>;
    fn set_width(&mut self, widget: Widget, width: &str) -> Result<()>;
    fn set_visible(&mut self, widget: Widget, visible: bool) -> Result<()>;
}

/// "NN%" of `max`, clamped to 0..=100
pub fn percent(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "0%".to_string();
    }
    let share = (value / max * 100.0).clamp(0.0, 100.0);
    format!("{}%", share.round() as u32)
}

/// seconds as m:ss
pub fn clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudFrame {
    pub score: String,
    pub clock: String,
    pub season: String,
    pub cheeks: String,
    pub coffee: String,
    pub golden: String,
    pub hint: Option<&'static str>,
    pub paused: bool,
    pub summary: Option<String>,
}

impl HudFrame {
    pub fn capture(session: &Session) -> Self {
        let player = session.player();
        let tuning = player.tuning();
        let golden = session
            .golden_remaining_ms()
            .map(|ms| percent(f64::from(ms), f64::from(tuning.golden_duration_ms)))
            .unwrap_or_else(|| "0%".to_string());
        let hint = match session.current_scene() {
            SceneId::Intro(step) => Some(intro::instructions(step)),
            _ => None,
        };
        let summary = session.is_frozen().then(|| {
            format!(
                "{} is over. {} acorns stored. Press E for {}.",
                session.season().name(),
                player.score(),
                session.season().next().name()
            )
        });

        HudFrame {
            score: player.score().to_string(),
            clock: session.time_left().map(clock).unwrap_or_default(),
            season: session.season().name().to_string(),
            cheeks: percent(f64::from(player.cheek_fill()), f64::from(player.capacity())),
            coffee: percent(player.coffee_buff(), tuning.coffee_buff),
            golden,
            hint,
            paused: session.is_paused(),
            summary,
        }
    }

    /// Every write this frame asks for, in page order.
    pub fn writes(&self) -> Vec<(Widget, Write)> {
        vec![
            (Widget::Score, Write::Text(self.score.clone())),
            (Widget::Clock, Write::Text(self.clock.clone())),
            (Widget::Season, Write::Text(self.season.clone())),
            (Widget::CheekBar, Write::Width(self.cheeks.clone())),
            (Widget::CoffeeBar, Write::Width(self.coffee.clone())),
            (Widget::GoldenBar, Write::Width(self.golden.clone())),
            (Widget::Hint, Write::Text(self.hint.unwrap_or("").to_string())),
            (Widget::Hint, Write::Visible(self.hint.is_some())),
            (Widget::PauseBanner, Write::Visible(self.paused)),
            (
                Widget::Summary,
                Write::Text(self.summary.clone().unwrap_or_default()),
            ),
            (Widget::Summary, Write::Visible(self.summary.is_some())),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Text(String),
    Width(String),
    Visible(bool),
}

/// What the page currently shows. A write is remembered only once the sink
/// accepted it, so a failed one is retried on the next frame.
#[derive(Debug, Default)]
pub struct Hud {
    shown: HashMap<(Widget, Discriminant<Write>), Write>,
}

impl Hud {
    pub fn new() -> Self {
        Hud::default()
    }

    /// Write every change in `frame`. A failing widget does not stop the
    /// others; all failures come back in one error.
    pub fn apply(&mut self, frame: &HudFrame, sink: &mut dyn HudSink) -> Result<()> {
        let mut failures = Vec::new();
        for (widget, write) in frame.writes() {
            let key = (widget, mem::discriminant(&write));
            if self.shown.get(&key) == Some(&write) {
                continue;
            }
            let result = match &write {
                Write::Text(text) => sink.set_text(widget, text),
                Write::Width(width) => sink.set_width(widget, width),
                Write::Visible(visible) => sink.set_visible(widget, *visible),
            };
            match result {
                Ok(()) => {
                    self.shown.insert(key, write);
                }
                Err(err) => failures.push(format!("{} : {:#}", widget.element_id(), err)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("hud writes failed : {}", failures.join("; ")))
        }
    }
}

// ==================== Browser ====================
pub struct BrowserHud;

impl HudSink for BrowserHud {
    fn set_text(&mut self, widget: Widget, text: &str) -> Result<()> {
        browser::html_element(widget.element_id())?.set_inner_text(text);
        Ok(())
    }

    fn set_width(&mut self, widget: Widget, width: &str) -> Result<()> {
        let element = browser::html_element(widget.element_id())?;
        browser::set_style(&element, "width", width)
    }

    fn set_visible(&mut self, widget: Widget, visible: bool) -> Result<()> {
        let element = browser::html_element(widget.element_id())?;
        browser::set_style(&element, "display", if visible { "block" } else { "none" })
    }
}
