//! Core shortcut engine
//!
//! Owns the context and turns requests from the extension into chord
//! matching, dispatch, persistence and toasts. Requests are handled one
//! at a time, in arrival order.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::actions::{ActionError, ActionId, ActionRegistry};
use crate::events::{DropReason, EngineEvent};
use crate::ipc::{ActionInfo, EngineState, KeyOutcome, Request, Response};
use crate::keys::{Chord, KeyEvent, KeyTracker};
use crate::notify::{Toast, ToastQueue};
use crate::platform::{Platform, TabInfo};
use crate::settings::Settings;
use crate::shortcuts::{resolve, Resolution, Shortcut, ShortcutRecord};
use crate::store::{Store, StoreRecord};

use super::context::EngineContext;
use super::dispatch::dispatch;

/// Host command that flips the enabled flag
pub const TOGGLE_COMMAND: &str = "toggle-extension";

/// A request paired with the channel for its response
#[derive(Debug)]
pub struct EngineRequest {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

/// The chord-matching and dispatch engine
pub struct ShortcutEngine<P> {
    ctx: EngineContext,
    tracker: KeyTracker,
    registry: ActionRegistry,
    platform: P,
    store: Store,
    toasts: ToastQueue,
    event_tx: broadcast::Sender<EngineEvent>,
}

impl<P: Platform> ShortcutEngine<P> {
    /// Create the engine, loading its context from the store
    pub fn new(
        store: Store,
        platform: P,
        toasts: ToastQueue,
        event_tx: broadcast::Sender<EngineEvent>,
    ) -> Result<Self> {
        let record = store.load_resolved()?;
        let ctx = EngineContext::from_record(record);
        info!(
            enabled = ctx.enabled,
            shortcuts = ctx.shortcuts.len(),
            "engine context loaded"
        );
        if ctx.shortcuts.is_empty() {
            info!("no shortcuts configured yet");
        }

        Ok(Self {
            ctx,
            tracker: KeyTracker::new(),
            registry: ActionRegistry::with_builtins(),
            platform,
            store,
            toasts,
            event_tx,
        })
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Run the engine, processing requests until every sender is dropped
    pub async fn run(&mut self, mut request_rx: mpsc::Receiver<EngineRequest>) {
        info!("engine started");

        while let Some(EngineRequest { request, reply }) = request_rx.recv().await {
            let response = self.handle_request(request).await;
            if reply.send(response).is_err() {
                debug!("requester went away before the response");
            }
        }

        info!("engine stopped");
    }

    /// Handle one request from the extension
    pub async fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::GetState => Response::State(EngineState {
                enabled: self.ctx.enabled,
                shortcuts_count: self.ctx.shortcuts.len(),
            }),

            Request::KeyEvent { event, tab } => {
                let tab = tab.unwrap_or_else(|| self.ctx.last_tab());
                Response::KeyHandled(self.handle_key_event(&event, &tab, Instant::now()).await)
            }

            Request::PageInfo { page } => {
                debug!(url = %page.url, "page info updated");
                self.ctx.last_page = Some(page);
                self.tracker.reset();
                Response::Ok
            }

            Request::Command { command } => self.handle_command(&command).await,

            Request::ToggleExtension { enabled } => {
                let enabled = enabled.unwrap_or(!self.ctx.enabled);
                Self::respond(self.set_enabled(enabled))
            }

            Request::SaveShortcut { chord, shortcut } => {
                match self.save_shortcut(&chord, &shortcut) {
                    Ok(()) => Response::Ok,
                    Err(e) => Response::error("invalid_shortcut", e.to_string()),
                }
            }

            Request::DeleteShortcut { chord } => match Chord::parse(&chord) {
                Ok(chord) => Self::respond(self.persist(|record| {
                    record.shortcuts.remove_chord(&chord);
                })),
                Err(e) => Response::error("invalid_chord", e.to_string()),
            },

            Request::DeleteBinding { chord, site_pattern } => match Chord::parse(&chord) {
                Ok(chord) => Self::respond(self.persist(|record| {
                    record.shortcuts.remove_binding(&chord, site_pattern.as_deref());
                })),
                Err(e) => Response::error("invalid_chord", e.to_string()),
            },

            Request::ListShortcuts => Response::Shortcuts {
                shortcuts: self.ctx.shortcuts.clone(),
            },

            Request::ListActions => Response::Actions {
                actions: ActionId::ALL.iter().copied().map(ActionInfo::from).collect(),
            },

            Request::ShortcutsChanged | Request::SettingsChanged => {
                self.reload();
                Response::Ok
            }

            Request::UpdateSettings { settings } => Self::respond(self.update_settings(settings)),

            Request::PermissionsChanged { granted } => {
                info!(?granted, "permissions changed");
                self.ctx.permissions.replace(granted);
                Response::Ok
            }

            Request::Subscribe | Request::HostCallResult { .. } => {
                Response::error("unsupported", "handled by the connection, not the engine")
            }
        }
    }

    fn respond(result: Result<()>) -> Response {
        match result {
            Ok(()) => Response::Ok,
            Err(e) => {
                warn!(error = %e, "store update failed");
                Response::error("store_error", format!("{e:#}"))
            }
        }
    }

    /// Feed a key event; dispatches when it completes a bound chord
    pub async fn handle_key_event(
        &mut self,
        event: &KeyEvent,
        tab: &TabInfo,
        now: Instant,
    ) -> KeyOutcome {
        let delay = self.ctx.settings.shortcut_delay();
        let Some(chord) = self.tracker.handle(event, now, delay) else {
            return KeyOutcome::Ignored;
        };

        let mode = self.ctx.settings.conflict_mode;
        let shortcut = match resolve(&self.ctx.shortcuts, &chord, &tab.url, mode) {
            Resolution::Unbound => {
                debug!(%chord, "chord not bound");
                return KeyOutcome::Unbound;
            }
            Resolution::Dropped => {
                debug!(%chord, url = %tab.url, "no shortcut applies to this page");
                self.emit(EngineEvent::ShortcutDropped {
                    chord,
                    reason: DropReason::NoSiteMatch,
                });
                return KeyOutcome::Dropped;
            }
            Resolution::Fire(shortcut) => shortcut.clone(),
        };

        if !self.ctx.enabled {
            debug!(%chord, "extension disabled, ignoring chord");
            self.emit(EngineEvent::ShortcutDropped {
                chord,
                reason: DropReason::Disabled,
            });
            return KeyOutcome::Ignored;
        }

        self.fire(&shortcut, tab).await
    }

    async fn fire(&mut self, shortcut: &Shortcut, tab: &TabInfo) -> KeyOutcome {
        info!(chord = %shortcut.chord, action = %shortcut.action, "shortcut triggered");
        match self.run_action(shortcut.action, tab, &shortcut.params).await {
            Ok(()) => {
                self.emit(EngineEvent::ShortcutTriggered {
                    chord: shortcut.chord.clone(),
                    action: shortcut.action,
                    url: tab.url.clone(),
                });
                KeyOutcome::Dispatched {
                    action: shortcut.action,
                }
            }
            Err(e) => KeyOutcome::Failed {
                action: shortcut.action,
                error: e.to_string(),
            },
        }
    }

    /// Dispatch an action and convert the outcome into at most one toast.
    /// Errors stop here.
    async fn run_action(
        &mut self,
        action: ActionId,
        tab: &TabInfo,
        params: &BTreeMap<String, String>,
    ) -> Result<(), ActionError> {
        let result = dispatch(
            &self.registry,
            &self.ctx.permissions,
            &mut self.platform,
            action,
            tab,
            params,
        )
        .await;

        match result {
            Ok(details) => {
                if let Some(toast) = Toast::for_action(action, &details) {
                    self.toast(toast);
                }
                Ok(())
            }
            Err(e) => {
                warn!(%action, error = %e, "action failed");
                match &e {
                    ActionError::Permission(denied) => self.emit(EngineEvent::PermissionDenied {
                        action,
                        missing: denied.missing.iter().map(|p| p.to_string()).collect(),
                    }),
                    other => self.emit(EngineEvent::ActionFailed {
                        action,
                        error: other.to_string(),
                    }),
                }
                self.toast(Toast::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Handle a browser command shortcut
    pub async fn handle_command(&mut self, command: &str) -> Response {
        if command == TOGGLE_COMMAND {
            let enabled = !self.ctx.enabled;
            let result = self.set_enabled(enabled);
            if result.is_ok() {
                self.toasts.push(Toast::extension_toggled(enabled));
            }
            return Self::respond(result);
        }

        let action: ActionId = match command.parse() {
            Ok(action) => action,
            Err(e) => return Response::error("unknown_command", e.to_string()),
        };

        if !self.ctx.enabled {
            return Response::KeyHandled(KeyOutcome::Ignored);
        }

        let tab = self.ctx.last_tab();
        info!(%action, "command triggered");
        match self.run_action(action, &tab, &BTreeMap::new()).await {
            Ok(()) => Response::KeyHandled(KeyOutcome::Dispatched { action }),
            Err(e) => Response::KeyHandled(KeyOutcome::Failed {
                action,
                error: e.to_string(),
            }),
        }
    }

    /// Switch the extension on or off and persist it
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.persist(|record| record.enabled = Some(enabled))?;
        self.emit(EngineEvent::EnabledChanged { enabled });
        Ok(())
    }

    /// Save a shortcut under `chord`, replacing the one in the same slot
    pub fn save_shortcut(&mut self, chord: &str, record: &ShortcutRecord) -> Result<()> {
        let chord = Chord::parse(chord)?;
        let shortcut = Shortcut::from_record(chord, record)?;
        info!(chord = %shortcut.chord, action = %shortcut.action, "saving shortcut");
        self.persist(|stored| {
            stored.shortcuts.insert(shortcut);
        })
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        self.persist(|record| record.settings = settings)
    }

    /// Read-modify-write the store, then reload the context from it
    fn persist(&mut self, edit: impl FnOnce(&mut StoreRecord)) -> Result<()> {
        let mut record = self.store.try_load()?;
        if record.enabled.is_none() {
            record.enabled = Some(self.ctx.enabled);
        }
        edit(&mut record);
        self.store.save(&record)?;
        self.apply(record);
        Ok(())
    }

    /// Reload the context wholesale from the store
    pub fn reload(&mut self) {
        let record = self.store.load();
        self.apply(record);
    }

    fn apply(&mut self, record: StoreRecord) {
        self.ctx.reload(record);
        self.emit(EngineEvent::ContextReloaded {
            shortcuts: self.ctx.shortcuts.len(),
        });
    }

    fn toast(&self, toast: Toast) {
        if self.ctx.settings.notifications {
            self.toasts.push(toast);
        }
    }

    fn emit(&self, event: EngineEvent) {
        debug!(%event, "emitting engine event");
        let _ = self.event_tx.send(event);
    }
}
