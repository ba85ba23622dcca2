//! Transient error notifications.
//!
//! A toast slides in, stays on screen for three seconds, slides out and is
//! removed. Nothing about it is fatal: the form stays usable underneath.
//!
//! Toasts share the terminal with the prompt and the result card, so each
//! one remembers the line it was written on. A [`LineCounter`] shared by
//! every writer to the terminal tells how far the cursor has moved since.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossterm::{QueueableCommand, cursor, terminal};
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// How long a toast stays fully visible.
pub const DISPLAY_FOR: Duration = Duration::from_millis(3000);
/// Length of the slide-in and slide-out transitions.
pub const SLIDE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Visible,
    Leaving,
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub shown_at: Instant,
    /// Terminal line the toast was written on.
    pub line: u64,
}

impl Toast {
    pub fn new(message: impl Into<String>, shown_at: Instant, line: u64) -> Self {
        Self {
            message: message.into(),
            shown_at,
            line,
        }
    }

    pub fn phase(&self, now: Instant) -> ToastPhase {
        let age = now.saturating_duration_since(self.shown_at);
        if age < SLIDE {
            ToastPhase::Entering
        } else if age < DISPLAY_FOR {
            ToastPhase::Visible
        } else if age < DISPLAY_FOR + SLIDE {
            ToastPhase::Leaving
        } else {
            ToastPhase::Dismissed
        }
    }

    pub fn dismissed_at(&self) -> Instant {
        self.shown_at + DISPLAY_FOR + SLIDE
    }
}

/// Number of lines written to the terminal so far, across all streams.
#[derive(Debug, Clone, Default)]
pub struct LineCounter(Arc<AtomicU64>);

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Records lines the terminal printed on its own, such as an echoed Enter.
    pub fn advance(&self, lines: u64) {
        self.0.fetch_add(lines, Ordering::SeqCst);
    }

    /// Wraps `inner` so every newline written through it is counted.
    pub fn writer<W: Write>(&self, inner: W) -> Counted<W> {
        Counted {
            inner,
            lines: self.clone(),
        }
    }
}

/// Writer returned by [`LineCounter::writer`].
#[derive(Debug)]
pub struct Counted<W> {
    inner: W,
    lines: LineCounter,
}

impl<W: Write> Write for Counted<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        let newlines = buf[..written].iter().filter(|&&b| b == b'\n').count();
        self.lines.advance(newlines as u64);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Toasts currently on screen, oldest first.
#[derive(Debug)]
pub struct Tray {
    toasts: Vec<Toast>,
    lines: LineCounter,
    rows: u16,
}

impl Tray {
    /// `rows` is the terminal height. Toasts scrolled further up than that
    /// are gone from the screen and are dropped without erasing.
    pub fn new(lines: LineCounter, rows: u16) -> Self {
        Self {
            toasts: Vec::new(),
            lines,
            rows,
        }
    }

    /// Writes `message` on a line of its own and keeps track of it.
    pub fn show<W: Write>(
        &mut self,
        message: impl Into<String>,
        now: Instant,
        out: &mut W,
    ) -> io::Result<()> {
        let toast = Toast::new(message, now, self.lines.current());
        let mut out = self.lines.writer(out);
        writeln!(out, "\u{2716} {}", toast.message)?;
        out.flush()?;
        self.toasts.push(toast);
        Ok(())
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// When the next toast is due to disappear.
    pub fn next_dismissal(&self) -> Option<Instant> {
        self.toasts.iter().map(Toast::dismissed_at).min()
    }

    /// Erases every toast that has run its course and returns how many are
    /// still showing.
    pub fn sweep<W: Write>(&mut self, now: Instant, out: &mut W) -> io::Result<usize> {
        let current = self.lines.current();
        let (due, kept): (Vec<Toast>, Vec<Toast>) = std::mem::take(&mut self.toasts)
            .into_iter()
            .partition(|toast| toast.phase(now) == ToastPhase::Dismissed);
        self.toasts = kept;

        for toast in &due {
            let up = current.saturating_sub(toast.line);
            if up == 0 || up >= u64::from(self.rows) {
                debug!(notification = %toast.message, up, "notification scrolled away");
                continue;
            }
            // Jump to the toast's line, clear it, and come back to where
            // the prompt or card left the cursor.
            out.queue(cursor::SavePosition)?;
            out.queue(cursor::MoveUp(up as u16))?;
            out.queue(terminal::Clear(terminal::ClearType::CurrentLine))?;
            out.queue(cursor::RestorePosition)?;
            debug!(notification = %toast.message, up, "notification dismissed");
        }
        if !due.is_empty() {
            out.flush()?;
        }

        Ok(self.toasts.len())
    }

    /// Waits for every toast to run its course, erasing each in turn.
    pub async fn drain<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        while let Some(deadline) = self.next_dismissal() {
            sleep_until(deadline).await;
            self.sweep(Instant::now(), out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays terminal output onto a grid of lines, honoring the handful of
    /// control sequences the tray and the card use.
    fn screen(bytes: &[u8]) -> Vec<String> {
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let mut rows: Vec<Vec<char>> = vec![Vec::new()];
        let (mut row, mut col) = (0usize, 0usize);
        let mut saved = (0usize, 0usize);
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\n' => {
                    row += 1;
                    col = 0;
                }
                '\r' => col = 0,
                '\x1b' => match chars.next() {
                    Some('7') => saved = (row, col),
                    Some('8') => (row, col) = saved,
                    Some('[') => {
                        let mut arg = String::new();
                        while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                            arg.push(d);
                        }
                        let n: usize = arg.parse().unwrap_or(1);
                        match chars.next() {
                            Some('A') => row = row.saturating_sub(n),
                            Some('K') => rows[row].clear(),
                            other => panic!("unexpected sequence {other:?}"),
                        }
                    }
                    other => panic!("unexpected escape {other:?}"),
                },
                c => {
                    while rows.len() <= row {
                        rows.push(Vec::new());
                    }
                    let line = &mut rows[row];
                    while line.len() < col {
                        line.push(' ');
                    }
                    if col < line.len() {
                        line[col] = c;
                    } else {
                        line.push(c);
                    }
                    col += 1;
                }
            }
            while rows.len() <= row {
                rows.push(Vec::new());
            }
        }

        rows.into_iter().map(|r| r.into_iter().collect()).collect()
    }

    #[test]
    fn toast_phases() {
        let shown = Instant::now();
        let toast = Toast::new("Birth date cannot be in the future", shown, 0);

        assert_eq!(toast.phase(shown), ToastPhase::Entering);
        assert_eq!(toast.phase(shown + Duration::from_millis(299)), ToastPhase::Entering);
        assert_eq!(toast.phase(shown + Duration::from_millis(300)), ToastPhase::Visible);
        assert_eq!(toast.phase(shown + Duration::from_millis(2999)), ToastPhase::Visible);
        assert_eq!(toast.phase(shown + Duration::from_millis(3000)), ToastPhase::Leaving);
        assert_eq!(toast.phase(shown + Duration::from_millis(3300)), ToastPhase::Dismissed);
        assert_eq!(toast.dismissed_at(), shown + Duration::from_millis(3300));
    }

    #[test]
    fn counted_writer_tracks_newlines() {
        let lines = LineCounter::new();
        let mut out = lines.writer(Vec::new());
        write!(out, "one\ntwo\n\rthree").unwrap();
        assert_eq!(lines.current(), 2);

        lines.advance(1);
        assert_eq!(lines.current(), 3);
    }

    #[test]
    fn dismissal_erases_the_toast_line_after_later_output() {
        let lines = LineCounter::new();
        let mut tray = Tray::new(lines.clone(), 40);
        let shown = Instant::now();
        let mut term = Vec::new();

        tray.show("Birth date cannot be in the future", shown, &mut term)
            .unwrap();
        {
            // Prompt, the date the user typed, then a card row.
            let mut out = lines.writer(&mut term);
            write!(out, "Birth date (YYYY-MM-DD, up to 2021-03-01): ").unwrap();
            writeln!(out, "2000-02-29").unwrap();
            writeln!(out, "Born: ...... 2000-02-29").unwrap();
            write!(out, "\r   0 years   0 months   0 days").unwrap();
        }

        let remaining = tray
            .sweep(shown + DISPLAY_FOR + SLIDE, &mut term)
            .unwrap();
        assert_eq!(remaining, 0);

        // The counter keeps drawing from where it was.
        write!(term, "\r  21 years   0 months   1 days").unwrap();

        let rows = screen(&term);
        assert_eq!(rows[0], "");
        assert_eq!(rows[1], "Birth date (YYYY-MM-DD, up to 2021-03-01): 2000-02-29");
        assert_eq!(rows[2], "Born: ...... 2000-02-29");
        assert_eq!(rows[3], "  21 years   0 months   1 days");
    }

    #[test]
    fn sweep_keeps_toasts_still_showing() {
        let lines = LineCounter::new();
        let mut tray = Tray::new(lines.clone(), 40);
        let start = Instant::now();
        let mut term = Vec::new();

        tray.show("first", start, &mut term).unwrap();
        tray.show("second", start + Duration::from_secs(2), &mut term)
            .unwrap();
        assert_eq!(tray.next_dismissal(), Some(start + DISPLAY_FOR + SLIDE));

        let before = term.len();
        assert_eq!(tray.sweep(start + Duration::from_secs(1), &mut term).unwrap(), 2);
        assert_eq!(term.len(), before);

        assert_eq!(tray.sweep(start + Duration::from_millis(3500), &mut term).unwrap(), 1);
        assert_eq!(tray.toasts()[0].message, "second");

        let rows = screen(&term);
        assert_eq!(rows[0], "");
        assert_eq!(rows[1], "\u{2716} second");
    }

    #[test]
    fn toast_scrolled_off_screen_is_dropped_quietly() {
        let lines = LineCounter::new();
        let mut tray = Tray::new(lines.clone(), 5);
        let start = Instant::now();
        let mut term = Vec::new();

        tray.show("Please select your date of birth", start, &mut term)
            .unwrap();
        lines.advance(10);
        let before = term.len();

        assert_eq!(tray.sweep(start + Duration::from_secs(4), &mut term).unwrap(), 0);
        assert_eq!(term.len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_every_toast() {
        let lines = LineCounter::new();
        let mut tray = Tray::new(lines.clone(), 40);
        let mut term = Vec::new();
        let started = Instant::now();

        tray.show("Please select your date of birth", started, &mut term)
            .unwrap();
        tray.show(
            "Birth date cannot be in the future",
            started + Duration::from_secs(1),
            &mut term,
        )
        .unwrap();

        tray.drain(&mut term).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1) + DISPLAY_FOR + SLIDE);
        assert!(tray.toasts().is_empty());
        assert!(screen(&term).iter().all(|row| row.is_empty()));
    }
}
