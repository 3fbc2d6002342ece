//! The host side of a jump session.
//!
//! Everything platform-specific lives behind `Host`: reading and writing the
//! selection, focusing editors, drawing the overlay, and running transient
//! effects. Host failures are reported as `anyhow::Error`; the engine logs
//! them and carries on.

use std::time::Duration;

use crate::candidate::Rect;
use crate::collector::TextSpanProvider;
use crate::context::OverlayContext;

/// A selection snapshot, as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<H> {
    pub anchor: H,
    pub anchor_offset: usize,
    pub focus: H,
    pub focus_offset: usize,
    /// Selected text, used to pre-fill the query prompt.
    pub text: String,
}

impl<H: Clone> Selection<H> {
    /// A collapsed selection (a caret).
    pub fn caret(handle: H, offset: usize) -> Self {
        Self {
            anchor: handle.clone(),
            anchor_offset: offset,
            focus: handle,
            focus_offset: offset,
            text: String::new(),
        }
    }
}

/// Where a jump puts the caret.
#[derive(Debug, Clone, PartialEq)]
pub struct CaretTarget<H> {
    pub handle: H,
    /// Char offset right after the matched text.
    pub offset: usize,
    /// The match ends at the end of its text unit. Hosts should prefer the
    /// logical insertion point after the unit (e.g. past an embedded
    /// element) in that case.
    pub at_unit_end: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectKind {
    /// Confirmation flash over the jump target.
    Flash { rects: Vec<Rect> },
    /// Short message, e.g. nothing found.
    Notice { message: String },
}

/// Fire-and-forget visual feedback.
///
/// The host owns the element it creates and removes it after `duration`
/// no matter what the session does in the meantime.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientEffect {
    pub kind: EffectKind,
    pub duration: Duration,
}

impl TransientEffect {
    pub fn flash(rects: Vec<Rect>, duration: Duration) -> Self {
        Self {
            kind: EffectKind::Flash { rects },
            duration,
        }
    }

    pub fn notice<T: Into<String>>(message: T, duration: Duration) -> Self {
        Self {
            kind: EffectKind::Notice {
                message: message.into(),
            },
            duration,
        }
    }
}

/// Platform integration for the jump engine.
pub trait Host: TextSpanProvider {
    fn selection(&self) -> Option<Selection<Self::Handle>>;

    fn set_selection(&mut self, selection: &Selection<Self::Handle>) -> anyhow::Result<()>;

    fn place_caret(&mut self, target: &CaretTarget<Self::Handle>) -> anyhow::Result<()>;

    /// Focus the nearest editable ancestor of `handle`.
    fn focus_editable(&mut self, handle: &Self::Handle) -> anyhow::Result<()>;

    /// Redraw prompt, highlights and markers from the snapshot.
    fn render(&mut self, overlay: &OverlayContext<Self::Handle>);

    fn schedule_effect(&mut self, effect: TransientEffect);

    /// Attach listeners and inject presentation assets.
    fn install(&mut self) {}

    /// Undo `install`.
    fn uninstall(&mut self) {}
}
