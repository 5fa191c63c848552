//! Sequencing of patterns on top of a sign.
//!
//! Deadlines run on the sign's own clock, so a suspended sign also pauses
//! its playlist. At most one advance is pending at any time.

use tracing::{info, warn};

use crate::pattern::Pattern;
use crate::render::Renderer;
use crate::sign::{LedSign, TransitionOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub pattern: Pattern,
    /// Time the pattern stays up once its transition is done. 0 holds
    /// until advanced by hand.
    pub hold_ms: f64,
    pub transition: TransitionOptions,
}

impl PlaylistEntry {
    pub fn new(pattern: Pattern, hold_ms: f64, transition: TransitionOptions) -> Self {
        Self {
            pattern,
            hold_ms,
            transition,
        }
    }

    /// Why the entry cannot be played, if it cannot.
    pub fn problem(&self) -> Option<String> {
        if self.pattern.is_empty() {
            return Some("pattern is empty".into());
        }
        if !self.hold_ms.is_finite() || self.hold_ms < 0.0 {
            return Some(format!("hold time {} is not a non-negative number", self.hold_ms));
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Playlist {
    entries: Vec<PlaylistEntry>,
    current: Option<usize>,
    /// Sign-clock deadline of the next automatic advance
    pending: Option<f64>,
    looping: bool,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            pending: None,
            looping: true,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Append an entry. Invalid entries are logged and dropped.
    pub fn push(&mut self, entry: PlaylistEntry) -> bool {
        if let Some(problem) = entry.problem() {
            warn!("Rejected playlist entry {}: {}", self.entries.len(), problem);
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn deadline(&self) -> Option<f64> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending advance. Nothing fires after this returns.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Show the first entry.
    pub fn start<R: Renderer>(&mut self, sign: &mut LedSign<R>) -> bool {
        self.jump(0, sign)
    }

    /// Show entry `index`. Out-of-range jumps are logged and ignored.
    pub fn jump<R: Renderer>(&mut self, index: usize, sign: &mut LedSign<R>) -> bool {
        let Some(entry) = self.entries.get(index) else {
            warn!(
                "Playlist jump to {} ignored, {} entries",
                index,
                self.entries.len()
            );
            return false;
        };

        sign.set_pattern(entry.pattern.clone(), entry.transition);
        self.current = Some(index);
        self.pending = self.schedule(entry, sign.clock_ms());
        info!(
            "Playlist entry {}/{} via {}",
            index + 1,
            self.entries.len(),
            entry.transition.strategy
        );
        true
    }

    pub fn next<R: Renderer>(&mut self, sign: &mut LedSign<R>) -> bool {
        match self.step(1) {
            Some(index) => self.jump(index, sign),
            None => {
                self.pending = None;
                false
            }
        }
    }

    pub fn previous<R: Renderer>(&mut self, sign: &mut LedSign<R>) -> bool {
        match self.step(-1) {
            Some(index) => self.jump(index, sign),
            None => false,
        }
    }

    /// Fire the pending advance once the sign clock has reached it.
    pub fn poll<R: Renderer>(&mut self, sign: &mut LedSign<R>) -> bool {
        match self.pending {
            Some(deadline) if sign.clock_ms() >= deadline => {
                self.pending = None;
                self.next(sign)
            }
            _ => false,
        }
    }

    /// Neighbouring index, honoring looping.
    fn step(&self, delta: isize) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        let Some(current) = self.current else {
            return Some(0);
        };
        let target = current as isize + delta;
        if (0..len as isize).contains(&target) {
            Some(target as usize)
        } else if self.looping {
            Some(target.rem_euclid(len as isize) as usize)
        } else {
            None
        }
    }

    fn schedule(&self, entry: &PlaylistEntry, now_ms: f64) -> Option<f64> {
        if entry.hold_ms <= 0.0 || self.entries.len() < 2 {
            return None;
        }
        let transition_ms = if entry.transition.is_instant() {
            0.0
        } else {
            entry.transition.duration_ms
        };
        Some(now_ms + transition_ms + entry.hold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SignOptions;
    use crate::render::RecordingRenderer;
    use crate::sign::Strategy;

    fn sign() -> LedSign<RecordingRenderer> {
        let options = SignOptions {
            fps: 0,
            ..SignOptions::default()
        };
        LedSign::with_seed(options, RecordingRenderer::new(), 100.0, 100.0, 1).unwrap()
    }

    fn entry(value: u8, hold_ms: f64) -> PlaylistEntry {
        PlaylistEntry::new(
            Pattern::new(vec![vec![value]]),
            hold_ms,
            TransitionOptions::instant(),
        )
    }

    fn playlist(n: u8) -> Playlist {
        let mut list = Playlist::new();
        for v in 1..=n {
            assert!(list.push(entry(v, 1000.0)));
        }
        list
    }

    #[test]
    fn rejects_invalid_entries() {
        let mut list = Playlist::new();
        assert!(!list.push(PlaylistEntry::new(
            Pattern::default(),
            10.0,
            TransitionOptions::instant()
        )));
        assert!(!list.push(entry(1, -1.0)));
        assert!(!list.push(entry(1, f64::NAN)));
        assert!(list.is_empty());
    }

    #[test]
    fn out_of_range_jump_is_a_noop() {
        let mut s = sign();
        let mut list = playlist(2);
        assert!(list.start(&mut s));
        assert!(!list.jump(5, &mut s));
        assert_eq!(list.current(), Some(0));
        assert_eq!(s.pattern(), &Pattern::new(vec![vec![1]]));
    }

    #[test]
    fn advances_on_sign_clock() {
        let mut s = sign();
        let mut list = playlist(3);
        s.tick(0.0);
        list.start(&mut s);
        assert_eq!(list.deadline(), Some(1000.0));

        s.tick(999.0);
        assert!(!list.poll(&mut s));
        s.tick(1000.0);
        assert!(list.poll(&mut s));
        assert_eq!(list.current(), Some(1));
        assert_eq!(s.pattern().get(0, 0), 2);
        assert_eq!(list.deadline(), Some(2000.0));
    }

    #[test]
    fn suspended_sign_pauses_playlist() {
        let mut s = sign();
        let mut list = playlist(2);
        s.tick(0.0);
        list.start(&mut s);
        s.suspend();
        s.tick(10_000.0);
        assert!(!list.poll(&mut s));
        assert_eq!(list.current(), Some(0));
    }

    #[test]
    fn cancel_prevents_advance() {
        let mut s = sign();
        let mut list = playlist(2);
        s.tick(0.0);
        list.start(&mut s);
        list.cancel();
        s.tick(5000.0);
        assert!(!list.poll(&mut s));
        assert_eq!(list.current(), Some(0));
    }

    #[test]
    fn transition_time_is_added_to_hold() {
        let mut s = sign();
        let mut list = Playlist::new();
        list.push(PlaylistEntry::new(
            Pattern::new(vec![vec![1]]),
            500.0,
            TransitionOptions::new(Strategy::Fade, 800.0),
        ));
        list.push(entry(2, 500.0));
        list.start(&mut s);
        assert_eq!(list.deadline(), Some(1300.0));
    }

    #[test]
    fn wraps_when_looping_and_stops_otherwise() {
        let mut s = sign();
        let mut list = playlist(3);
        list.start(&mut s);
        assert!(list.previous(&mut s));
        assert_eq!(list.current(), Some(2));
        assert!(list.next(&mut s));
        assert_eq!(list.current(), Some(0));

        let mut once = playlist(2).with_looping(false);
        once.start(&mut s);
        assert!(once.next(&mut s));
        assert!(!once.next(&mut s));
        assert_eq!(once.current(), Some(1));
        assert!(!once.is_pending());
    }
}
