/// What a timer does when it fires. The session decides what that means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    CoffeeDecay,
    GoldenExpiry,
    CountdownTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    kind: TimerKind,
    due_ms: u64,
    repeat_ms: Option<u32>,
}

/// Timers driven by the frame clock instead of the browser's `setTimeout`,
/// so they advance with the game loop and can be cancelled deterministically.
#[derive(Debug, Default)]
pub struct Timers {
    now_ms: u64,
    next_handle: u64,
    pending: Vec<Timer>,
}

impl Timers {
    pub fn new() -> Self {
        Timers::default()
    }

    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, after_ms: u32, kind: TimerKind) -> TimerHandle {
        self.insert(after_ms, kind, None)
    }

    pub fn schedule_repeating(&mut self, interval_ms: u32, kind: TimerKind) -> TimerHandle {
        // a zero interval would fire forever within one advance
        let interval_ms = interval_ms.max(1);
        self.insert(interval_ms, kind, Some(interval_ms))
    }

    fn insert(&mut self, after_ms: u32, kind: TimerKind, repeat_ms: Option<u32>) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.pending.push(Timer {
            handle,
            kind,
            due_ms: self.now_ms + u64::from(after_ms),
            repeat_ms,
        });
        log::debug!("timer {:?} armed: {:?} in {}ms", handle, kind, after_ms);
        handle
    }

    /// `false` when the timer already fired (one-shot) or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    /// milliseconds until the next firing
    pub fn remaining(&self, handle: TimerHandle) -> Option<u32> {
        self.pending
            .iter()
            .find(|timer| timer.handle == handle)
            .map(|timer| (timer.due_ms.saturating_sub(self.now_ms)) as u32)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Move the clock forward and return every firing in due order. A
    /// repeating timer fires once per elapsed interval.
    pub fn advance(&mut self, dt_ms: u32) -> Vec<(TimerHandle, TimerKind)> {
        let target = self.now_ms + u64::from(dt_ms);
        let mut fired = Vec::new();
        loop {
            let next = self
                .pending
                .iter()
                .enumerate()
                .filter(|(_, timer)| timer.due_ms <= target)
                .min_by_key(|(_, timer)| (timer.due_ms, timer.handle))
                .map(|(index, _)| index);
            let Some(index) = next else {
                break;
            };

            let timer = &mut self.pending[index];
            self.now_ms = timer.due_ms;
            fired.push((timer.handle, timer.kind));
            match timer.repeat_ms {
                Some(interval) => timer.due_ms += u64::from(interval),
                None => {
                    self.pending.swap_remove(index);
                }
            }
        }
        self.now_ms = target;
        fired
    }
}
