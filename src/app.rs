use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use ledsign::options::{ScrollDirection, ScrollOptions};
use ledsign::playlist::Playlist;
use ledsign::{LedSign, SignOptions, SignResult};

use crate::event::Event;
use crate::ui::led_view::TerminalRenderer;
use crate::ui::STATUS_BAR_HEIGHT;

// ── Application State ─────────────────────────────────────────────────

pub struct App {
    pub sign: LedSign<TerminalRenderer>,
    pub playlist: Playlist,
    pub should_quit: bool,

    /// Paused with the space key
    pub paused: bool,
    /// Terminal window lost focus
    pub focus_lost: bool,

    /// Configured scroll, restored when scrolling is toggled back on
    scroll: ScrollOptions,
    started: Instant,
}

impl App {
    /// Build the sign for a `cols x rows` terminal and show the first
    /// playlist entry.
    pub fn new(options: SignOptions, playlist: Playlist, cols: u16, rows: u16) -> SignResult<Self> {
        let px_per_cell = options.led_size + options.led_gap;
        let scroll = options.scroll;

        let renderer = TerminalRenderer::new(cols, sign_rows(rows), px_per_cell);
        let (width, height) = renderer.surface_size();
        let sign = LedSign::new(options, renderer, width, height)?;

        let mut app = Self {
            sign,
            playlist,
            should_quit: false,
            paused: false,
            focus_lost: false,
            scroll,
            started: Instant::now(),
        };
        if !app.playlist.start(&mut app.sign) {
            warn!("Playlist is empty, showing an idle sign");
        }
        Ok(app)
    }

    /// Milliseconds since startup, the host timestamp for `tick`
    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick => self.on_tick(self.now_ms()),
            Event::Key(key) => self.handle_key(key),
            Event::Resize(cols, rows) => self.resize(cols, rows),
            Event::FocusLost => {
                self.focus_lost = true;
                self.sync_suspension();
            }
            Event::FocusGained => {
                self.focus_lost = false;
                self.sync_suspension();
            }
        }
    }

    pub fn on_tick(&mut self, ts_ms: f64) {
        self.playlist.poll(&mut self.sign);
        self.sign.tick(ts_ms);
    }

    /// Handle a key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                self.sync_suspension();
            }
            KeyCode::Char('n') | KeyCode::Right => {
                self.playlist.next(&mut self.sign);
            }
            KeyCode::Char('p') | KeyCode::Left => {
                self.playlist.previous(&mut self.sign);
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.playlist.jump(index, &mut self.sign);
            }
            KeyCode::Char('s') => self.toggle_scroll(),
            _ => {}
        }
    }

    fn toggle_scroll(&mut self) {
        let current = self.sign.scroll();
        let next = if current.direction == ScrollDirection::None {
            ScrollOptions {
                direction: match self.scroll.direction {
                    ScrollDirection::None => ScrollDirection::Left,
                    dir => dir,
                },
                speed: self.scroll.speed,
            }
        } else {
            ScrollOptions {
                direction: ScrollDirection::None,
                ..current
            }
        };
        debug!("Scroll {:?}", next.direction);
        self.sign.set_scroll(next);
    }

    /// Suspended while paused or unfocused
    fn sync_suspension(&mut self) {
        if self.paused || self.focus_lost {
            self.sign.suspend();
        } else {
            self.sign.resume();
        }
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        let rows = sign_rows(rows);
        self.sign.renderer_mut().resize(cols, rows);
        let (width, height) = self.sign.renderer().surface_size();
        if let Err(e) = self.sign.resize(width, height) {
            warn!("Ignoring resize to {}x{}: {}", cols, rows, e);
        }
    }

    /// Tear the sign down.
    pub fn shutdown(self) {
        self.sign.destroy();
        info!("Sign stopped");
    }
}

fn sign_rows(terminal_rows: u16) -> u16 {
    terminal_rows.saturating_sub(STATUS_BAR_HEIGHT)
}
