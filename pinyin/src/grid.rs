//! Terminal-style host: one text unit per row on a fixed cell grid.
//!
//! Han and full-width chars take two cells, everything else one. Rows past
//! `visible_rows` are outside the viewport. The host keeps the caret, focus
//! and effects it was asked for so callers can report them.

use hintjump_core::{
    CaretTarget, Host, OverlayContext, Rect, Selection, TextSpan, TextSpanProvider, TransientEffect,
};

pub const CELL_WIDTH: f64 = 8.0;
pub const ROW_HEIGHT: f64 = 16.0;

/// Number of grid cells `ch` occupies.
pub fn cell_width(ch: char) -> usize {
    match ch as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridHost {
    lines: Vec<String>,
    visible_rows: Option<usize>,
    selection: Option<Selection<usize>>,
    caret: Option<CaretTarget<usize>>,
    focused: Option<usize>,
    overlay: OverlayContext<usize>,
    effects: Vec<TransientEffect>,
}

impl GridHost {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Only the first `rows` lines are on screen.
    pub fn with_visible_rows(mut self, rows: usize) -> Self {
        self.visible_rows = Some(rows);
        self
    }

    pub fn with_selection(mut self, selection: Selection<usize>) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    pub fn caret(&self) -> Option<&CaretTarget<usize>> {
        self.caret.as_ref()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn current_selection(&self) -> Option<&Selection<usize>> {
        self.selection.as_ref()
    }

    /// The overlay as last rendered.
    pub fn overlay(&self) -> &OverlayContext<usize> {
        &self.overlay
    }

    pub fn effects(&self) -> &[TransientEffect] {
        &self.effects
    }

    fn viewport(&self) -> Rect {
        let rows = self.visible_rows.unwrap_or(self.lines.len());
        let cols = self
            .lines
            .iter()
            .map(|l| l.chars().map(cell_width).sum::<usize>())
            .max()
            .unwrap_or(0);
        Rect::new(0.0, 0.0, cols as f64 * CELL_WIDTH, rows as f64 * ROW_HEIGHT)
    }

    fn columns(&self, row: usize, start: usize, len: usize) -> Option<(usize, usize)> {
        let line = self.lines.get(row)?;
        let left = line.chars().take(start).map(cell_width).sum();
        let width = line.chars().skip(start).take(len).map(cell_width).sum();
        Some((left, width))
    }
}

impl TextSpanProvider for GridHost {
    type Handle = usize;

    fn visible_spans(&self) -> Vec<TextSpan<usize>> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(row, text)| {
                let (_, width) = self.columns(row, 0, text.chars().count())?;
                let rect = Rect::new(0.0, row as f64 * ROW_HEIGHT, width as f64 * CELL_WIDTH, ROW_HEIGHT);
                Some(TextSpan::new(text.clone(), vec![rect], row))
            })
            .filter(|span| span.rects.iter().any(|r| self.is_visible(r)))
            .collect()
    }

    fn measure(&self, handle: &usize, start: usize, len: usize) -> Vec<Rect> {
        match self.columns(*handle, start, len) {
            Some((left, width)) if width > 0 => vec![Rect::new(
                left as f64 * CELL_WIDTH,
                *handle as f64 * ROW_HEIGHT,
                width as f64 * CELL_WIDTH,
                ROW_HEIGHT,
            )],
            _ => Vec::new(),
        }
    }

    fn is_visible(&self, rect: &Rect) -> bool {
        self.viewport().intersects(rect)
    }
}

impl Host for GridHost {
    fn selection(&self) -> Option<Selection<usize>> {
        self.selection.clone()
    }

    fn set_selection(&mut self, selection: &Selection<usize>) -> anyhow::Result<()> {
        if selection.anchor >= self.lines.len() || selection.focus >= self.lines.len() {
            anyhow::bail!("selection refers to a row that no longer exists");
        }
        self.selection = Some(selection.clone());
        Ok(())
    }

    fn place_caret(&mut self, target: &CaretTarget<usize>) -> anyhow::Result<()> {
        let Some(line) = self.lines.get(target.handle) else {
            anyhow::bail!("no row {}", target.handle);
        };
        let offset = target.offset.min(line.chars().count());
        self.selection = Some(Selection::caret(target.handle, offset));
        self.caret = Some(CaretTarget {
            offset,
            ..target.clone()
        });
        Ok(())
    }

    fn focus_editable(&mut self, handle: &usize) -> anyhow::Result<()> {
        self.focused = Some(*handle);
        Ok(())
    }

    fn render(&mut self, overlay: &OverlayContext<usize>) {
        self.overlay = overlay.clone();
    }

    fn schedule_effect(&mut self, effect: TransientEffect) {
        self.effects.push(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_chars_take_two_cells() {
        assert_eq!(cell_width('a'), 1);
        assert_eq!(cell_width('你'), 2);
        assert_eq!(cell_width('，'), 2);
    }

    #[test]
    fn measure_counts_cells() {
        let host = GridHost::new(["ab你好"]);
        assert_eq!(host.measure(&0, 2, 2), vec![Rect::new(16.0, 0.0, 32.0, 16.0)]);
        assert!(host.measure(&0, 4, 1).is_empty());
        assert!(host.measure(&3, 0, 1).is_empty());
    }

    #[test]
    fn rows_past_the_viewport_are_hidden() {
        let host = GridHost::new(["one", "two", "three"]).with_visible_rows(2);
        let rows: Vec<usize> = host.visible_spans().iter().map(|s| s.handle).collect();
        assert_eq!(rows, vec![0, 1]);
    }

    #[test]
    fn caret_is_clamped_to_the_row() {
        let mut host = GridHost::new(["abc"]);
        host.place_caret(&CaretTarget {
            handle: 0,
            offset: 10,
            at_unit_end: true,
        })
        .expect("row exists");
        assert_eq!(host.caret().map(|c| c.offset), Some(3));
        assert!(host
            .place_caret(&CaretTarget {
                handle: 5,
                offset: 0,
                at_unit_end: false
            })
            .is_err());
    }
}
