// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Application state and logic
//!
//! The app is the only writer of UI state. Input goes to the top of the
//! modal stack, or to the chat view when the stack is empty. Spawned tasks
//! and flow callbacks report back through the event channel, which is
//! drained once per loop iteration.

use std::path::PathBuf;
use std::rc::Rc;

use crate::chat::{ChatRecord, ChatSession, MemoryTranscripts, TranscriptStore};
use crate::config::Settings;
use crate::flow::builtin::ApiKeySetup;
use crate::modal::{EventBus, ModalStack};
use crate::tui::events::{self, AppEvent, EventReceiver, EventSender, StateEvent, TestId};
use crate::tui::input::InputEvent;
use crate::tui::view::{Effect, Next, Status, Update, View, ViewContext};
use crate::tui::views::{setup_view, ChatView, ConnectionTestModal};

/// Message sent by the connection test
pub const PROBE_MESSAGE: &str = "Reply with the single word: pong";

/// Title given to archived conversations
const TRANSCRIPT_TITLE: &str = "Chat";

pub struct App {
    session: ChatSession,
    settings: Settings,
    settings_path: Option<PathBuf>,
    chat: ChatView,
    modals: ModalStack<dyn View, StateEvent>,
    bus: Rc<EventBus<StateEvent>>,
    events: EventSender,
    event_rx: EventReceiver,
    transcripts: MemoryTranscripts,
    last_setup: Option<ApiKeySetup>,
    /// Id of the most recent connection test
    connection_test: TestId,
    status: Option<Status>,
    should_quit: bool,
}

impl App {
    pub fn new(session: ChatSession, settings: Settings) -> Self {
        let bus = Rc::new(EventBus::new());
        let (events, event_rx) = events::channel();
        Self {
            session,
            settings,
            settings_path: None,
            chat: ChatView::new(),
            modals: ModalStack::with_bus(bus.clone()),
            bus,
            events,
            event_rx,
            transcripts: MemoryTranscripts::new(),
            last_setup: None,
            connection_test: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Where remembered keys are written; without one they stay in memory
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn chat(&self) -> &ChatView {
        &self.chat
    }

    pub fn modals(&self) -> &ModalStack<dyn View, StateEvent> {
        &self.modals
    }

    pub fn bus(&self) -> &Rc<EventBus<StateEvent>> {
        &self.bus
    }

    /// Sender for posting events to this app
    pub fn events(&self) -> EventSender {
        self.events.clone()
    }

    pub fn transcripts(&self) -> &MemoryTranscripts {
        &self.transcripts
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            is_error: true,
        });
    }

    /// Push the provider and API key setup flow
    pub fn open_setup(&mut self) {
        let providers = self.session.registry().names();
        let ctx = ViewContext::new(&self.events, &providers, self.session.provider_name());
        let view = setup_view(&ctx);
        self.open(Box::new(view));
    }

    pub fn open(&mut self, mut view: Box<dyn View>) {
        let providers = self.session.registry().names();
        let mut ctx = ViewContext::new(&self.events, &providers, self.session.provider_name());
        view.init(&mut ctx);
        if let Some(status) = ctx.take_status() {
            self.status = Some(status);
        }
        tracing::debug!(kind = ?view.kind(), depth = self.modals.len() + 1, "opening view");
        self.modals.push(view);
    }

    /// Route one key press
    pub fn handle_input(&mut self, event: InputEvent) {
        if event == InputEvent::Interrupt {
            self.should_quit = true;
            return;
        }

        let providers = self.session.registry().names();
        let mut ctx = ViewContext::new(&self.events, &providers, self.session.provider_name());
        let (update, from_modal) = match self.modals.current_mut() {
            Some(view) => (view.update(&event, &mut ctx), true),
            None => (self.chat.update(&event, &mut ctx), false),
        };
        if let Some(status) = ctx.take_status() {
            self.status = Some(status);
        }
        self.apply(update, from_modal);
    }

    fn apply(&mut self, update: Update, from_modal: bool) {
        match update.next {
            Next::Stay => {}
            Next::Close => {
                if from_modal {
                    self.modals.pop();
                }
            }
            Next::Replace(view) => {
                if from_modal {
                    self.modals.pop();
                }
                self.open(view);
            }
            Next::Open(view) => self.open(view),
        }
        if let Some(effect) = update.effect {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Send(text) => self.send_message(text),
            Effect::ClearChat => self.clear_chat(),
            Effect::Quit => self.should_quit = true,
        }
    }

    /// Drain pending events, then let the top view catch up
    pub fn tick(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        if let Some(view) = self.modals.current_mut() {
            view.tick();
        }
        handled
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SetupCompleted(setup) => self.complete_setup(setup),
            AppEvent::ExitConfirmed(true) => self.should_quit = true,
            AppEvent::ExitConfirmed(false) => {}
            AppEvent::StreamChunk(exchange, chunk) => {
                if self.chat.is_current(exchange) {
                    self.chat.append_chunk(&chunk);
                }
            }
            AppEvent::ReplyFinished(exchange, reply) => {
                if !self.chat.is_current(exchange) {
                    tracing::debug!(exchange, "dropping stale reply");
                    return;
                }
                self.session.record_reply(reply.clone());
                self.chat.finish_reply(reply);
            }
            AppEvent::ReplyFailed(exchange, error) => {
                if self.chat.is_current(exchange) {
                    self.chat.fail_reply(error);
                } else {
                    tracing::debug!(exchange, error = %error, "dropping stale failure");
                }
            }
            AppEvent::State(state) => {
                let delivered = self.bus.publish(state);
                tracing::trace!(delivered, "state event published");
            }
        }
    }

    fn complete_setup(&mut self, setup: ApiKeySetup) {
        if let Err(e) = self.session.configure(&setup) {
            self.set_error(e.to_string());
            return;
        }
        tracing::info!(provider = %setup.provider, remember = setup.remember, "provider configured");

        let mut status = format!("Using {}", setup.provider);
        if setup.remember {
            self.settings.remember_api_key(&setup.provider, setup.api_key.clone());
            if let Some(path) = &self.settings_path {
                match self.settings.save_to(path) {
                    Ok(()) => status.push_str(", key saved"),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to save settings");
                        status = format!("Using {}, but the key was not saved: {}", setup.provider, e);
                    }
                }
            }
        }
        self.set_status(status);

        let test_requested = setup.test_requested;
        self.last_setup = Some(setup);
        if test_requested {
            self.start_connection_test();
        }
    }

    fn start_connection_test(&mut self) {
        let request = match self.session.probe(PROBE_MESSAGE) {
            Ok(request) => request,
            Err(e) => {
                self.set_error(e.to_string());
                return;
            }
        };
        let provider = request.provider.name().to_string();
        self.connection_test += 1;
        let test = self.connection_test;
        self.open(Box::new(ConnectionTestModal::new(test, provider.clone())));
        self.bus.publish(StateEvent::ConnectionTestStarted {
            test,
            provider: provider.clone(),
        });

        let tx = self.events.clone();
        tokio::spawn(async move {
            let chunk_tx = tx.clone();
            let result = request
                .run(|chunk| {
                    let _ = chunk_tx.send(AppEvent::State(StateEvent::ConnectionTestChunk {
                        test,
                        chunk: chunk.to_string(),
                    }));
                })
                .await;
            let state = match result {
                Ok(reply) => StateEvent::ConnectionTestPassed {
                    test,
                    provider,
                    reply,
                },
                Err(e) => {
                    tracing::warn!(provider = %provider, error = %e, "connection test failed");
                    StateEvent::ConnectionTestFailed {
                        test,
                        provider,
                        error: e.to_string(),
                    }
                }
            };
            let _ = tx.send(AppEvent::State(state));
        });
    }

    fn send_message(&mut self, text: String) {
        let request = match self.session.prepare(&text) {
            Ok(request) => request,
            Err(e) => {
                // Give the text back so it is not lost
                self.chat.set_input(text);
                self.set_error(e.to_string());
                return;
            }
        };
        tracing::debug!(?request, "sending message");
        let exchange = self.chat.begin_exchange(text);

        let tx = self.events.clone();
        tokio::spawn(async move {
            let chunk_tx = tx.clone();
            let event = match request
                .run(|chunk| {
                    let _ = chunk_tx.send(AppEvent::StreamChunk(exchange, chunk.to_string()));
                })
                .await
            {
                Ok(reply) => AppEvent::ReplyFinished(exchange, reply),
                Err(e) => {
                    tracing::warn!(error = %e, "request failed");
                    AppEvent::ReplyFailed(exchange, e.to_string())
                }
            };
            let _ = tx.send(event);
        });
    }

    /// Archive the conversation, then start over
    fn clear_chat(&mut self) {
        if !self.session.history().is_empty() {
            let title = self.transcripts.unique_title(TRANSCRIPT_TITLE);
            let record = match &self.last_setup {
                Some(setup) => ChatRecord::from_setup(title, setup, self.session.model())
                    .with_messages(self.session.history().to_vec()),
                None => self.session.to_record(title),
            };
            if let Err(e) = self.transcripts.insert(record) {
                tracing::warn!(error = %e, "failed to archive conversation");
            }
        }
        self.session.clear();
        self.chat.clear();
        self.set_status("Conversation cleared");
    }
}
