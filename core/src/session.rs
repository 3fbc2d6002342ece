//! Jump session state.
//!
//! The `JumpSession` struct holds everything that lives for one
//! activate → select → deactivate cycle: the lifecycle state, the typed
//! label prefix, the live hints and the selection snapshot taken on
//! activation. It does not talk to the host; `JumpEngine` drives it.

use crate::candidate::Point;
use crate::context::{HintView, OverlayContext};
use crate::host::Selection;
use crate::input_buffer::InputBuffer;
use crate::label::HintEntry;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing showing.
    #[default]
    Idle,
    /// Query prompt open, no hints yet.
    AwaitingQuery,
    /// Hints showing, consuming label keystrokes.
    Active,
}

/// State of the current session.
#[derive(Debug, Clone)]
pub struct JumpSession<H> {
    state: SessionState,
    buffer: InputBuffer,
    hints: Vec<HintEntry<H>>,
    markers: Vec<Point>,
    saved_selection: Option<Selection<H>>,
    prefill: String,
}

impl<H> Default for JumpSession<H> {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            buffer: InputBuffer::new(),
            hints: Vec::new(),
            markers: Vec::new(),
            saved_selection: None,
            prefill: String::new(),
        }
    }
}

impl<H: Clone> JumpSession<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub fn hints(&self) -> &[HintEntry<H>] {
        &self.hints
    }

    pub fn markers(&self) -> &[Point] {
        &self.markers
    }

    pub fn saved_selection(&self) -> Option<&Selection<H>> {
        self.saved_selection.as_ref()
    }

    pub fn prefill(&self) -> &str {
        &self.prefill
    }

    /// Idle → AwaitingQuery. The prompt is pre-filled with the selected text.
    pub fn begin_query(&mut self, saved: Option<Selection<H>>) {
        self.reset();
        self.prefill = saved
            .as_ref()
            .map(|s| s.text.trim().to_string())
            .unwrap_or_default();
        self.saved_selection = saved;
        self.state = SessionState::AwaitingQuery;
    }

    /// AwaitingQuery → Active with the given hints.
    pub fn activate(&mut self, hints: Vec<HintEntry<H>>, markers: Vec<Point>) {
        self.buffer.clear();
        self.hints = hints;
        self.markers = markers;
        self.prefill.clear();
        self.state = SessionState::Active;
    }

    /// Hint whose label is exactly `typed`.
    pub fn exact_hint(&self, typed: &str) -> Option<&HintEntry<H>> {
        self.hints.iter().find(|h| h.label == typed)
    }

    /// Some hint can still be reached by typing more after `typed`.
    pub fn has_prefix(&self, typed: &str) -> bool {
        self.hints.iter().any(|h| h.is_possible(typed))
    }

    pub fn possible_hints(&self) -> impl Iterator<Item = &HintEntry<H>> {
        self.hints.iter().filter(|h| h.is_possible(self.buffer.text()))
    }

    pub fn push_key(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    pub fn pop_key(&mut self) -> Option<char> {
        self.buffer.pop()
    }

    /// Hand out the selection snapshot; it is only ever used once.
    pub fn take_saved_selection(&mut self) -> Option<Selection<H>> {
        self.saved_selection.take()
    }

    /// Back to Idle, dropping hints and the snapshot.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Write the renderer-facing view of this session into `context`.
    pub fn sync_to_context(&self, context: &mut OverlayContext<H>) {
        context.clear();
        match self.state {
            SessionState::Idle => {}
            SessionState::AwaitingQuery => {
                context.prompt_open = true;
                context.prompt_prefill = self.prefill.clone();
            }
            SessionState::Active => {
                let typed = self.buffer.text();
                context.buffer = typed.to_string();
                context.hints = self
                    .hints
                    .iter()
                    .enumerate()
                    .map(|(i, hint)| HintView {
                        label: hint.label.clone(),
                        span: hint.span.clone(),
                        strategy: hint.strategy,
                        marker: self.markers.get(i).copied().unwrap_or(hint.anchor),
                        possible: hint.is_possible(typed),
                    })
                    .collect();
            }
        }
    }
}
