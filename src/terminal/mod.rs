// SPDX-License-Identifier: GPL-3.0-only

//! Terminal capture client
//!
//! Renders the camera feed to the terminal using Unicode half-block
//! characters, next to a capture panel with the countdown and snapshot list.
//! Everything runs on one loop: it drains background messages, polls the
//! camera, draws, and waits briefly for a key press.

mod keymap;
mod widgets;

pub use keymap::{Action, InputMode, map_key};

use crate::backends::camera::CameraSession;
use crate::capture::{CaptureMode, CaptureScreen, EffectRunner, Message, StatusMessage};
use crate::config::Config;
use crate::constants::timing;
use crate::upload::CountingClient;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
};
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};
use widgets::{CapturePanel, FrameWidget, StatusBar};

/// Width of the capture panel in columns
const PANEL_WIDTH: u16 = 44;

pub struct TerminalOptions {
    pub mode: CaptureMode,
    /// Serve this image file instead of opening a camera
    pub source: Option<PathBuf>,
    /// Effective config, including environment and command line overrides
    pub config: Config,
    /// Problem with the config file, shown on the status line at start
    pub config_error: Option<String>,
}

/// Run the terminal capture client
pub fn run(options: TerminalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let TerminalOptions {
        mode,
        source,
        config,
        config_error,
    } = options;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let client = CountingClient::new(&config.upload_config())?;

    let camera = match source {
        Some(path) => CameraSession::still(path),
        None => CameraSession::pipewire(config.camera_facing, config.last_camera_path.clone()),
    };
    let mut screen = CaptureScreen::new(mode, camera, config.capture_interval)
        .with_persistence(mode == CaptureMode::Manual && config.persist_captures);
    if let Some(reason) = config_error {
        screen = screen.with_status(StatusMessage::error(format!(
            "Config ignored, using defaults: {}",
            reason
        )));
    }

    let (sender, receiver) = mpsc::unbounded_channel();
    let runner = EffectRunner::new(
        Arc::new(client),
        runtime.handle().clone(),
        sender,
        config.photo_directory(),
    );

    info!(mode = ?mode, api_url = %config.api_url, "Starting terminal client");

    let mut app = App {
        screen,
        runner,
        receiver,
        selected: None,
        input: InputMode::Normal,
        show_help: false,
    };

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match Config::default_path() {
        Some(path) => remember_choices(&path, &config, &app.screen),
        None => warn!("No config directory available, session choices not saved"),
    }

    drop(app);
    runtime.shutdown_timeout(Duration::from_secs(timing::STOP_TIMEOUT_SECS));
    result
}

/// Store the interval and camera chosen in this session
fn remember_choices(path: &Path, config: &Config, screen: &CaptureScreen) {
    let interval = screen.timer().interval();
    let camera_path = screen.last_camera_path().map(str::to_string);
    let camera_changed = camera_path.is_some() && camera_path != config.last_camera_path;
    if interval == config.capture_interval && !camera_changed {
        return;
    }

    let result = Config::update_file(path, |stored| {
        stored.capture_interval = interval;
        if camera_path.is_some() {
            stored.last_camera_path = camera_path;
        }
    });
    match result {
        Ok(()) => info!(interval = interval.seconds(), "Session choices saved"),
        Err(e) => warn!(error = %e, "Failed to save session choices"),
    }
}

struct App {
    screen: CaptureScreen,
    runner: EffectRunner<CountingClient>,
    receiver: UnboundedReceiver<Message>,
    selected: Option<usize>,
    input: InputMode,
    show_help: bool,
}

impl App {
    fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            while let Ok(message) = self.receiver.try_recv() {
                self.dispatch(message);
            }

            self.screen.poll_frame();
            terminal.draw(|f| self.draw(f))?;

            // Handle input with timeout for frame updates
            if event::poll(Duration::from_millis(timing::INPUT_POLL_MS))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && !self.handle_key(key)
            {
                break;
            }
        }

        let effects = self.screen.shutdown();
        self.runner.run(effects);
        Ok(())
    }

    fn dispatch(&mut self, message: Message) {
        let effects = self.screen.update(message);
        self.runner.run(effects);

        let len = self.screen.snapshots().len();
        self.selected = match (self.selected, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(index), _) => Some(index.min(len - 1)),
        };
    }

    /// Returns false when the user asked to quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match map_key(key, self.input, self.screen.mode()) {
            Action::Quit => return false,
            Action::Dispatch(message) => {
                self.show_help = false;
                self.dispatch(message);
            }
            Action::SelectNext => {
                let len = self.screen.snapshots().len();
                if len > 0 {
                    self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(len - 1)));
                }
            }
            Action::SelectPrevious => {
                self.selected = self.selected.map(|i| i.saturating_sub(1));
            }
            Action::BeginDraft => self.input = InputMode::Draft,
            Action::BeginEdit => {
                if let Some(index) = self.selected
                    && let Some(snapshot) = self.screen.snapshots().get(index)
                {
                    let id = snapshot.id();
                    self.dispatch(Message::ToggleEdit(index));
                    self.input = InputMode::Snapshot(id);
                }
            }
            Action::Delete => {
                if let Some(index) = self.selected {
                    self.dispatch(Message::Delete(index));
                }
            }
            Action::CountSelected => {
                if let Some(index) = self.selected {
                    self.dispatch(Message::CountFlowers(index));
                }
            }
            Action::Type(c) => self.edit_text(|text| text.push(c)),
            Action::Backspace => self.edit_text(|text| {
                text.pop();
            }),
            Action::FinishInput => {
                if let InputMode::Snapshot(id) = self.input
                    && let Some(index) = self.screen.snapshots().position(id)
                {
                    self.dispatch(Message::ToggleEdit(index));
                }
                self.input = InputMode::Normal;
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::None => {}
        }
        true
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        match self.input {
            InputMode::Normal => {}
            InputMode::Draft => {
                let mut text = self.screen.draft_metadata().to_string();
                edit(&mut text);
                self.dispatch(Message::SetDraftMetadata(text));
            }
            InputMode::Snapshot(id) => {
                let snapshots = self.screen.snapshots();
                let Some(index) = snapshots.position(id) else {
                    self.input = InputMode::Normal;
                    return;
                };
                let mut text = snapshots
                    .get(index)
                    .map(|s| s.metadata().to_string())
                    .unwrap_or_default();
                edit(&mut text);
                self.dispatch(Message::UpdateMetadata(index, text));
            }
        }
    }

    fn draw(&self, f: &mut Frame) {
        let area = f.area();

        // Reserve bottom line for status
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let [camera_area, panel_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(PANEL_WIDTH)])
                .areas(main_area);

        let placeholder = if self.screen.is_camera_active() {
            "Waiting for camera..."
        } else {
            "Camera off, press 'c' to start"
        };
        f.render_widget(
            FrameWidget {
                frame: self.screen.current_frame(),
                placeholder,
            },
            camera_area,
        );

        f.render_widget(
            CapturePanel {
                screen: &self.screen,
                selected: self.selected,
                input: self.input,
            },
            panel_area,
        );

        self.draw_status(f, status_area);
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let mode = self.screen.mode();
        let (message, error) = if self.show_help {
            (keymap::help(mode), false)
        } else if let Some(status) = self.screen.status() {
            (status.text.as_str(), status.is_error())
        } else {
            (keymap::hints(mode), false)
        };
        f.render_widget(StatusBar { message, error }, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::{CameraFrame, FrameSource};
    use crate::constants::CaptureInterval;

    struct NamedCamera;

    impl FrameSource for NamedCamera {
        fn device_name(&self) -> &str {
            "rear"
        }

        fn device_path(&self) -> Option<&str> {
            Some("pipewire-serial-77")
        }

        fn latest_frame(&mut self) -> Option<CameraFrame> {
            None
        }
    }

    #[test]
    fn test_remember_choices_does_not_persist_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let stored = Config {
            api_url: "http://counter.local:9000".into(),
            ..Config::default()
        };
        stored.save_to(&path).unwrap();

        let effective = stored.with_overrides(None, Some("http://one-off:8000".into()));
        let camera =
            CameraSession::new(Box::new(|| Ok(Box::new(NamedCamera) as Box<dyn FrameSource>)));
        let mut screen =
            CaptureScreen::new(CaptureMode::Timed, camera, effective.capture_interval);
        screen.update(Message::StartCamera);
        screen.update(Message::SetInterval(CaptureInterval::Ten));
        screen.shutdown();

        remember_choices(&path, &effective, &screen);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.api_url, "http://counter.local:9000");
        assert_eq!(reloaded.capture_interval, CaptureInterval::Ten);
        assert_eq!(reloaded.last_camera_path.as_deref(), Some("pipewire-serial-77"));
    }

    #[test]
    fn test_remember_choices_skips_unchanged_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config::default();
        let camera =
            CameraSession::new(Box::new(|| Ok(Box::new(NamedCamera) as Box<dyn FrameSource>)));
        let screen = CaptureScreen::new(CaptureMode::Timed, camera, config.capture_interval);

        remember_choices(&path, &config, &screen);
        assert!(!path.exists());
    }
}
