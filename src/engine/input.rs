use crate::browser;
use anyhow::Result;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use std::collections::HashSet;
use wasm_bindgen::JsCast;

/// Raw browser key transition, identified by `KeyboardEvent.code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    KeyDown(String),
    KeyUp(String),
}

/// Held keys plus the transitions that arrived since the last update
#[derive(Debug, Default)]
pub struct KeyState {
    pressed: HashSet<String>,
    presses: Vec<KeyPress>,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState::default()
    }

    pub fn presses(&self) -> &[KeyPress] {
        &self.presses
    }

    /// Browsers repeat keydown while a key is held; only the first one is kept.
    pub fn record(&mut self, press: KeyPress) {
        match &press {
            KeyPress::KeyDown(code) => {
                if !self.pressed.insert(code.clone()) {
                    return;
                }
            }
            KeyPress::KeyUp(code) => {
                self.pressed.remove(code);
            }
        }
        self.presses.push(press);
    }

    pub fn end_frame(&mut self) {
        self.presses.clear();
    }
}

/// Route window key events into a channel drained once per frame.
pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
    let (keydown_sender, keyevent_receiver) = unbounded();
    let keyup_sender = keydown_sender.clone();

    let onkeydown = browser::closure_wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(event.code()));
    }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

    let onkeyup = browser::closure_wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        let _ = keyup_sender.unbounded_send(KeyPress::KeyUp(event.code()));
    }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);

    let window = browser::window()?;
    window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
    window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));
    // handlers live as long as the page
    onkeydown.forget();
    onkeyup.forget();

    Ok(keyevent_receiver)
}

pub fn process_input(state: &mut KeyState, receiver: &mut UnboundedReceiver<KeyPress>) {
    loop {
        match receiver.try_next() {
            // channel closed
            Ok(None) => break,
            // nothing queued
            Err(_) => break,
            Ok(Some(press)) => state.record(press),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_keydown_is_recorded_once() {
        let mut state = KeyState::new();
        state.record(KeyPress::KeyDown("KeyD".into()));
        state.record(KeyPress::KeyDown("KeyD".into()));
        assert_eq!(state.presses().len(), 1);

        state.record(KeyPress::KeyUp("KeyD".into()));
        state.record(KeyPress::KeyDown("KeyD".into()));
        assert_eq!(
            state.presses(),
            &[
                KeyPress::KeyDown("KeyD".into()),
                KeyPress::KeyUp("KeyD".into()),
                KeyPress::KeyDown("KeyD".into())
            ]
        );
    }

    #[test]
    fn end_frame_keeps_held_keys() {
        let mut state = KeyState::new();
        state.record(KeyPress::KeyDown("Space".into()));
        state.end_frame();
        assert!(state.presses().is_empty());

        // still held, so the browser's repeat is not a new press
        state.record(KeyPress::KeyDown("Space".into()));
        assert!(state.presses().is_empty());
    }

    #[test]
    fn process_input_drains_the_channel() {
        let (sender, mut receiver) = unbounded();
        sender.unbounded_send(KeyPress::KeyDown("ArrowLeft".into())).unwrap();
        sender.unbounded_send(KeyPress::KeyUp("ArrowLeft".into())).unwrap();

        let mut state = KeyState::new();
        process_input(&mut state, &mut receiver);
        assert_eq!(
            state.presses(),
            &[
                KeyPress::KeyDown("ArrowLeft".into()),
                KeyPress::KeyUp("ArrowLeft".into())
            ]
        );
    }
}
