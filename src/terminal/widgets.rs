// SPDX-License-Identifier: GPL-3.0-only

//! Terminal widgets: live frame, capture panel and status bar

use super::keymap::InputMode;
use crate::backends::camera::CameraFrame;
use crate::capture::{CaptureMode, CaptureScreen};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};

/// Renders a camera frame using half-block characters
pub struct FrameWidget<'a> {
    pub frame: Option<&'a CameraFrame>,
    pub placeholder: &'a str,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame.filter(|f| f.width > 0 && f.height > 0) else {
            let msg = self.placeholder;
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Upper half (▀) takes the fg colour, lower half the bg colour
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (tr, tg, tb) = frame.pixel_rgb(src_x, src_y_top);
                let (br, bg, bb) = frame.pixel_rgb(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Capture state and the snapshot list
pub struct CapturePanel<'a> {
    pub screen: &'a CaptureScreen,
    pub selected: Option<usize>,
    pub input: InputMode,
}

impl CapturePanel<'_> {
    fn info_lines(&self) -> Vec<Line<'static>> {
        let screen = self.screen;
        let mut lines = Vec::new();

        let camera = match screen.camera_name() {
            Some(name) => format!("Camera: on ({})", name),
            None => "Camera: off".to_string(),
        };
        lines.push(Line::from(camera));
        lines.push(Line::from(format!("Image Count: {}", screen.snapshots().len())));

        match screen.mode() {
            CaptureMode::Timed => {
                lines.push(Line::from(format!("Interval: {}", screen.timer().interval())));
                lines.push(match screen.timer().remaining() {
                    Some(remaining) => Line::from(Span::styled(
                        format!("Next capture in {} seconds", remaining),
                        Style::default().fg(Color::Green),
                    )),
                    None => Line::from("Capture stopped"),
                });
            }
            CaptureMode::Manual => {
                lines.push(Line::from(if screen.is_capturing() {
                    Span::styled("Capturing", Style::default().fg(Color::Green))
                } else {
                    Span::raw("Not capturing")
                }));
            }
        }

        let cursor = if self.input == InputMode::Draft { "_" } else { "" };
        lines.push(Line::from(format!(
            "Metadata: {}{}",
            screen.draft_metadata(),
            cursor
        )));
        lines
    }

    fn snapshot_items(&self) -> Vec<ListItem<'static>> {
        self.screen
            .snapshots()
            .iter()
            .enumerate()
            .map(|(index, snapshot)| {
                let metadata = if snapshot.metadata().is_empty() && !snapshot.is_editing() {
                    "(no metadata)".to_string()
                } else {
                    snapshot.metadata().to_string()
                };
                let mut spans = vec![
                    Span::raw(format!(
                        "{:>2}. {}  ",
                        index + 1,
                        snapshot.timestamp().format("%H:%M:%S")
                    )),
                    Span::raw(metadata),
                ];
                if snapshot.is_editing() {
                    spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    }
}

impl Widget for CapturePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let info = self.info_lines();
        let chunks = Layout::vertical([
            Constraint::Length(info.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

        Paragraph::new(info)
            .block(Block::bordered().title(" Capture "))
            .render(chunks[0], buf);

        let list = List::new(self.snapshot_items())
            .block(Block::bordered().title(" Snapshots "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(self.selected);
        StatefulWidget::render(list, chunks[1], buf, &mut state);
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    pub message: &'a str,
    pub error: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = if self.error { Color::Red } else { Color::DarkGray };
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, Style::default().fg(Color::White).bg(bg));
    }
}
