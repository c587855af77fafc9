//! Show/fade state machine for the info card.
//!
//! `Hidden -> Showing -> Hiding -> Hidden`, re-entrant on [`OverlayMachine::select`].
//! The machine owns its timers; a presenter (DOM card, window title) reads the
//! state and drains [`OverlayEvent`]s after each frame.

use std::time::Duration;

use glam::Vec2;
use log::debug;

use crate::constants::{OVERLAY_FADE_DURATION, OVERLAY_HIDE_DELAY, OVERLAY_MARGIN, OVERLAY_WIDE_FLIP_GAP};
use crate::location::Location;
use crate::timer::{TimerId, Timers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    Hidden,
    Showing,
    Hiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlayTimer {
    Hide,
    Cleanup,
}

/// Notifications for the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// A (possibly different) location is now shown; content must be rendered.
    Shown { location: String },
    /// Same location, new anchor.
    Moved,
    /// Opacity fade towards hidden has begun.
    FadeStarted,
    /// Fade finished; the card element may be released.
    Released,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState {
    pub phase: OverlayPhase,
    pub selected: Option<Location>,
    pub screen_position: Vec2,
    pub hide_timer: Option<TimerId>,
    pub cleanup_timer: Option<TimerId>,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            phase: OverlayPhase::Hidden,
            selected: None,
            screen_position: Vec2::ZERO,
            hide_timer: None,
            cleanup_timer: None,
        }
    }
}

#[derive(Debug)]
pub struct OverlayMachine {
    state: OverlayState,
    timers: Timers<OverlayTimer>,
    events: Vec<OverlayEvent>,
    hide_delay: Duration,
    fade_duration: Duration,
    needs_placement: bool,
}

impl Default for OverlayMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayMachine {
    pub fn new() -> Self {
        Self::with_durations(OVERLAY_HIDE_DELAY, OVERLAY_FADE_DURATION)
    }

    pub fn with_durations(hide_delay: Duration, fade_duration: Duration) -> Self {
        Self {
            state: OverlayState::default(),
            timers: Timers::new(),
            events: Vec::new(),
            hide_delay,
            fade_duration,
            needs_placement: false,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn phase(&self) -> OverlayPhase {
        self.state.phase
    }

    pub fn selected(&self) -> Option<&Location> {
        self.state.selected.as_ref()
    }

    pub fn screen_position(&self) -> Vec2 {
        self.state.screen_position
    }

    /// Pending timer handles. Never more than one of each kind.
    pub fn outstanding_timers(&self) -> usize {
        self.timers.outstanding()
    }

    pub fn needs_placement(&self) -> bool {
        self.needs_placement
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, OverlayEvent> {
        self.events.drain(..)
    }

    pub fn select(&mut self, location: Location, position: Vec2, now: Duration) {
        self.cancel_hide();
        self.cancel_cleanup();
        let same = self.state.phase == OverlayPhase::Showing
            && self.state.selected.as_ref().map(|l| l.id.as_str()) == Some(location.id.as_str());
        if same {
            self.events.push(OverlayEvent::Moved);
        } else {
            debug!("[overlay] show {}", location.id);
            self.events.push(OverlayEvent::Shown {
                location: location.id.clone(),
            });
        }
        self.state.selected = Some(location);
        self.state.screen_position = position;
        self.state.phase = OverlayPhase::Showing;
        self.needs_placement = true;
        self.state.hide_timer = Some(self.timers.schedule(now + self.hide_delay, OverlayTimer::Hide));
    }

    /// Start the fade now. Ignored unless Showing.
    pub fn request_hide(&mut self, now: Duration) {
        if self.state.phase == OverlayPhase::Showing {
            self.cancel_hide();
            self.begin_fade(now);
        }
    }

    /// Restart the delayed hide (touch lifted). Ignored unless Showing.
    pub fn arm_hide(&mut self, now: Duration) {
        if self.state.phase == OverlayPhase::Showing {
            self.cancel_hide();
            self.state.hide_timer = Some(self.timers.schedule(now + self.hide_delay, OverlayTimer::Hide));
        }
    }

    /// Fire due timers. The fade is anchored on the hide deadline, so a late
    /// call can run the whole hide and release in one go.
    pub fn advance(&mut self, now: Duration) {
        loop {
            let due = self.timers.poll(now);
            if due.is_empty() {
                break;
            }
            for fired in due {
                match fired.kind {
                    OverlayTimer::Hide if self.state.hide_timer == Some(fired.id) => {
                        self.state.hide_timer = None;
                        self.begin_fade(fired.deadline);
                    }
                    OverlayTimer::Cleanup if self.state.cleanup_timer == Some(fired.id) => {
                        self.state.cleanup_timer = None;
                        self.release();
                    }
                    _ => {}
                }
            }
        }
    }

    /// Clamp the card inside the viewport. Call once the card size is known,
    /// before its first paint after a select.
    pub fn place(&mut self, card: Vec2, viewport: Vec2, narrow: bool) -> Vec2 {
        let placed = clamp_card_position(self.state.screen_position, card, viewport, narrow);
        self.needs_placement = false;
        placed
    }

    /// Hide immediately without a fade, e.g. when the location set changes.
    pub fn dismiss(&mut self) {
        let was_live = self.state.phase != OverlayPhase::Hidden;
        self.timers.cancel_all();
        self.state = OverlayState::default();
        self.needs_placement = false;
        if was_live {
            self.events.push(OverlayEvent::Released);
        }
    }

    /// Cancel everything; nothing fires afterwards.
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.state = OverlayState::default();
        self.needs_placement = false;
        self.events.clear();
    }

    fn begin_fade(&mut self, started_at: Duration) {
        self.state.phase = OverlayPhase::Hiding;
        self.events.push(OverlayEvent::FadeStarted);
        self.state.cleanup_timer = Some(
            self.timers
                .schedule(started_at + self.fade_duration, OverlayTimer::Cleanup),
        );
    }

    fn release(&mut self) {
        debug!("[overlay] released");
        self.state.phase = OverlayPhase::Hidden;
        self.state.selected = None;
        self.needs_placement = false;
        self.events.push(OverlayEvent::Released);
    }

    fn cancel_hide(&mut self) {
        if let Some(id) = self.state.hide_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn cancel_cleanup(&mut self) {
        if let Some(id) = self.state.cleanup_timer.take() {
            self.timers.cancel(id);
        }
    }
}

/// Keep a `card`-sized box anchored at `anchor` inside the viewport with a
/// margin. Narrow layouts stay centred within the margins and flip above the
/// anchor when the bottom would overflow; wide layouts flip left and pull up.
pub fn clamp_card_position(anchor: Vec2, card: Vec2, viewport: Vec2, narrow: bool) -> Vec2 {
    let m = OVERLAY_MARGIN;
    let mut p = anchor;
    if narrow {
        p.x = p.x.min(viewport.x - card.x - m).max(m);
        if p.y + card.y > viewport.y - m {
            p.y = anchor.y - card.y - m;
        }
    } else {
        if p.x + card.x > viewport.x {
            p.x = anchor.x - card.x - OVERLAY_WIDE_FLIP_GAP;
        }
        if p.y + card.y > viewport.y {
            p.y = viewport.y - card.y - m;
        }
    }
    // Final pass: inside [m, v - c - m]; oversized cards pin to the top/left margin.
    p.x = p.x.min(viewport.x - card.x - m).max(m);
    p.y = p.y.min(viewport.y - card.y - m).max(m);
    p
}
