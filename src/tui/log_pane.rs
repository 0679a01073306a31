//! Captured tracing output for dashboard mode
//!
//! While the dashboard owns the terminal, the fmt layer writes into a
//! [`LogBuffer`] instead of stderr. The [`LogPane`] drains it and shows the
//! most recent lines in a toggleable pane.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tracing_subscriber::fmt::MakeWriter;

/// Lines held between two drains.
const PENDING_CAPACITY: usize = 500;

/// Lines kept for scrolling in the pane.
const HISTORY_CAPACITY: usize = 1000;

/// Height of the pane including borders.
pub const LOG_PANE_HEIGHT: u16 = 10;

/// Shared sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, dropping the oldest one when full.
    pub fn push(&self, line: String) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() == PENDING_CAPACITY {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Take every pending line, oldest first.
    pub fn drain(&self) -> Vec<String> {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.drain(..).collect()
    }
}

/// Per-event writer handed out by [`LogBuffer::make_writer`].
///
/// The fmt layer writes one event per writer; bytes are split on newlines
/// and any unterminated tail is pushed on drop.
pub struct LineWriter {
    sink: LogBuffer,
    partial: Vec<u8>,
}

impl LineWriter {
    fn emit(&mut self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end_matches(['\r', '\n']);
        if !text.is_empty() {
            self.sink.push(text.to_string());
        }
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.partial.extend_from_slice(buf);
        while let Some(end) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=end).collect();
            self.emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.partial.is_empty() {
            let rest = std::mem::take(&mut self.partial);
            self.emit(&rest);
        }
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            sink: self.clone(),
            partial: Vec::new(),
        }
    }
}

/// State of the log pane.
pub struct LogPane {
    source: LogBuffer,
    history: VecDeque<String>,
    pub visible: bool,
    /// Lines scrolled back from the newest (0 = follow).
    scroll_back: usize,
}

impl LogPane {
    pub fn new(source: LogBuffer) -> Self {
        Self {
            source,
            history: VecDeque::new(),
            visible: false,
            scroll_back: 0,
        }
    }

    /// Pull pending lines from the buffer. Call once per frame.
    pub fn refresh(&mut self) {
        for line in self.source.drain() {
            if self.history.len() == HISTORY_CAPACITY {
                self.history.pop_front();
            }
            self.history.push_back(line);
        }
        self.scroll_back = self.scroll_back.min(self.max_scroll());
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scroll_back = (self.scroll_back + n).min(self.max_scroll());
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(n);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    fn max_scroll(&self) -> usize {
        self.history.len().saturating_sub(1)
    }

    /// The `height` lines ending `scroll_back` lines before the newest.
    fn window(&self, height: usize) -> impl Iterator<Item = &String> {
        let end = self.history.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        self.history.range(start..end)
    }
}

/// Render the log pane.
pub fn render(area: Rect, buf: &mut Buffer, pane: &LogPane) {
    let title = if pane.scroll_back > 0 {
        format!(" Log (-{}) ", pane.scroll_back)
    } else {
        " Log ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let lines: Vec<Line> = pane
        .window(inner.height as usize)
        .map(|line| Line::from(Span::styled(line.clone(), level_style(line))))
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

/// Color by the level column of the fmt layer output.
fn level_style(line: &str) -> Style {
    let level = line
        .split_whitespace()
        .find(|word| matches!(*word, "ERROR" | "WARN" | "INFO" | "DEBUG" | "TRACE"));
    let color = match level {
        Some("ERROR") => Color::Red,
        Some("WARN") => Color::Yellow,
        Some("INFO") => Color::Green,
        Some(_) => Color::DarkGray,
        None => Color::White,
    };
    Style::default().fg(color)
}
