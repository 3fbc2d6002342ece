//! Jump engine with session management and event processing.
//!
//! `JumpEngine` owns one `JumpSession` and drives it from host events:
//! the activation gesture opens the query prompt, a submitted query runs
//! collection and labeling, and label keystrokes narrow the hints down to
//! a single jump. After every visible change the engine refreshes its
//! `OverlayContext` and hands it to `Host::render`.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::candidate::{Candidate, CandidateSpan};
use crate::collector::CandidateCollector;
use crate::context::OverlayContext;
use crate::host::{CaretTarget, Host, Selection, TransientEffect};
use crate::key_event::{EventResult, InputEvent, Key, KeyInput};
use crate::label::{assign_labels, layout_markers, HintEntry, LabelAlphabet};
use crate::matcher::{query_tokens, QueryMatcher};
use crate::romanize::Romanizer;
use crate::session::{JumpSession, SessionState};
use crate::Config;

/// Jump engine bound to one host.
pub struct JumpEngine<R, H: Host> {
    config: Config,
    alphabet: LabelAlphabet,
    activation_key: Key,
    matcher: QueryMatcher<R>,
    host: H,
    session: JumpSession<H::Handle>,
    context: OverlayContext<H::Handle>,
    installed: bool,
    /// Timestamp of a pending first activation press.
    last_activation: Option<Duration>,
}

impl<R: Romanizer, H: Host> JumpEngine<R, H> {
    /// Create an engine. Fails only on an unusable label alphabet.
    pub fn new(romanizer: R, host: H, config: Config) -> anyhow::Result<Self> {
        let alphabet = config.alphabet()?;
        let activation_key = config.activation_key();
        Ok(Self {
            config,
            alphabet,
            activation_key,
            matcher: QueryMatcher::new(romanizer),
            host,
            session: JumpSession::new(),
            context: OverlayContext::new(),
            installed: false,
            last_activation: None,
        })
    }

    /// Attach to the host. Events are ignored until this is called.
    pub fn init(&mut self) {
        if self.installed {
            return;
        }
        self.host.install();
        self.installed = true;
        info!(alphabet = self.alphabet.len(), "jump engine installed");
    }

    /// Tear down any live session and detach from the host.
    pub fn destroy(&mut self) {
        if !self.installed {
            return;
        }
        if !self.session.is_idle() {
            self.deactivate(false);
        }
        self.host.uninstall();
        self.installed = false;
        self.last_activation = None;
        info!("jump engine uninstalled");
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &JumpSession<H::Handle> {
        &self.session
    }

    pub fn context(&self) -> &OverlayContext<H::Handle> {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn alphabet(&self) -> &LabelAlphabet {
        &self.alphabet
    }

    pub fn matcher(&self) -> &QueryMatcher<R> {
        &self.matcher
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Process one host event.
    ///
    /// Returns `EventResult::Handled` when the host should stop the event
    /// from reaching the application.
    pub fn process_event(&mut self, event: InputEvent) -> EventResult {
        if !self.installed {
            return EventResult::NotHandled;
        }

        match event {
            InputEvent::Key(input) => self.process_key(input),
            InputEvent::SubmitQuery(raw) => {
                if self.session.state() != SessionState::AwaitingQuery {
                    return EventResult::NotHandled;
                }
                self.submit_query(&raw);
                EventResult::Handled
            }
            InputEvent::PointerDown { inside_prompt } => {
                match self.session.state() {
                    SessionState::Active => self.deactivate(false),
                    SessionState::AwaitingQuery if !inside_prompt => self.deactivate(false),
                    _ => {}
                }
                // The click still belongs to the page.
                EventResult::NotHandled
            }
            InputEvent::Scroll | InputEvent::Wheel => {
                if self.session.state() == SessionState::Active {
                    debug!("viewport moved, dismissing hints");
                    self.deactivate(false);
                }
                EventResult::NotHandled
            }
        }
    }

    fn process_key(&mut self, input: KeyInput) -> EventResult {
        let state = self.session.state();

        // A held key must not toggle or type twice.
        if input.repeat {
            return match state {
                SessionState::Active => EventResult::Handled,
                _ => EventResult::NotHandled,
            };
        }

        if input.key == self.activation_key {
            return self.process_activation_press(input.timestamp);
        }
        self.last_activation = None;

        match state {
            SessionState::Idle => EventResult::NotHandled,
            SessionState::AwaitingQuery => match input.key {
                Key::Escape => {
                    self.deactivate(true);
                    EventResult::Handled
                }
                // Everything else is typing into the prompt.
                _ => EventResult::NotHandled,
            },
            SessionState::Active => {
                self.process_label_key(input.key);
                EventResult::Handled
            }
        }
    }

    fn process_activation_press(&mut self, at: Duration) -> EventResult {
        let is_double = self
            .last_activation
            .map(|first| at.saturating_sub(first) <= self.config.activation_timeout())
            .unwrap_or(false);

        if !is_double {
            self.last_activation = Some(at);
            return match self.session.state() {
                SessionState::Active => EventResult::Handled,
                _ => EventResult::NotHandled,
            };
        }

        self.last_activation = None;
        if self.session.is_idle() {
            self.open_prompt();
        } else {
            debug!(state = ?self.session.state(), "activation gesture toggles session off");
            self.deactivate(true);
        }
        EventResult::Handled
    }

    fn process_label_key(&mut self, key: Key) {
        match key {
            Key::Escape => self.deactivate(true),
            Key::Backspace => {
                if self.session.pop_key().is_some() {
                    self.sync();
                }
            }
            Key::Char(ch) => {
                let ch = ch.to_lowercase().next().unwrap_or(ch);
                if !self.alphabet.contains(ch) {
                    return;
                }
                let typed = self.session.buffer().with_char(ch);
                if let Some(span) = self.session.exact_hint(&typed).map(|h| h.span.clone()) {
                    debug!(label = %typed, "label complete");
                    self.jump(span);
                    self.session.reset();
                    self.sync();
                } else if self.session.has_prefix(&typed) {
                    self.session.push_key(ch);
                    self.sync();
                } else {
                    debug!(typed = %typed, "no label with this prefix, keystroke rejected");
                }
            }
            // Swallowed so the document is not edited under the overlay.
            _ => {}
        }
    }

    fn open_prompt(&mut self) {
        let saved = self.host.selection();
        debug!(has_selection = saved.is_some(), "opening query prompt");
        self.session.begin_query(saved);
        self.sync();
    }

    /// Run a submitted query. Empty queries leave the prompt open.
    fn submit_query(&mut self, raw: &str) {
        let query = self.matcher.romanizer().normalize_query(raw);
        let tokens = query_tokens(&query);
        if tokens.is_empty() {
            debug!("empty query ignored");
            return;
        }

        let mut candidates = self.collect(&tokens);
        info!(tokens = tokens.len(), candidates = candidates.len(), "query collected");

        match candidates.len() {
            0 => {
                self.host.schedule_effect(TransientEffect::notice(
                    self.config.not_found_message.clone(),
                    self.config.notice_duration(),
                ));
                self.deactivate(true);
            }
            1 => {
                if let Some(only) = candidates.pop() {
                    self.session.take_saved_selection();
                    self.jump(only.span);
                }
                self.session.reset();
                self.sync();
            }
            _ => {
                let hints = assign_labels(candidates, &self.alphabet);
                self.show_hints(hints);
            }
        }
    }

    /// Collect deduplicated candidates for `tokens` from the host.
    pub fn collect<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Candidate<H::Handle>> {
        CandidateCollector::new(&self.matcher)
            .max_candidates(self.config.max_candidates)
            .dedup_tolerance(self.config.dedup_tolerance_px)
            .collect(&self.host, tokens)
    }

    /// Lay out markers for `hints` and enter `Active`.
    pub fn show_hints(&mut self, hints: Vec<HintEntry<H::Handle>>) {
        let markers = layout_markers(&hints, self.config.overlap_band_px, self.config.overlap_gap_px);
        self.session.activate(hints, markers);
        self.sync();
    }

    /// Put the caret right after `span` and focus its editor.
    ///
    /// Host failures are logged; the session deactivates either way.
    fn jump(&mut self, span: CandidateSpan<H::Handle>) {
        let target = CaretTarget {
            handle: span.handle.clone(),
            offset: span.end(),
            at_unit_end: span.touches_unit_end(),
        };
        if let Err(e) = self.host.place_caret(&target) {
            warn!(handle = ?target.handle, "failed to place caret: {:#}", e);
        }
        if let Err(e) = self.host.focus_editable(&span.handle) {
            warn!(handle = ?span.handle, "failed to focus editable: {:#}", e);
        }
        info!(handle = ?target.handle, offset = target.offset, "jumped");
        self.host
            .schedule_effect(TransientEffect::flash(span.rects, self.config.flash_duration()));
    }

    fn restore(&mut self, selection: Selection<H::Handle>) {
        if let Err(e) = self.host.set_selection(&selection) {
            warn!("failed to restore selection: {:#}", e);
        }
        if let Err(e) = self.host.focus_editable(&selection.anchor) {
            warn!(handle = ?selection.anchor, "failed to refocus editable: {:#}", e);
        }
    }

    /// Back to `Idle`, optionally re-applying the saved selection.
    fn deactivate(&mut self, restore: bool) {
        let saved = self.session.take_saved_selection();
        if restore {
            if let Some(selection) = saved {
                self.restore(selection);
            }
        }
        self.session.reset();
        self.sync();
    }

    fn sync(&mut self) {
        self.session.sync_to_context(&mut self.context);
        self.host.render(&self.context);
    }
}
