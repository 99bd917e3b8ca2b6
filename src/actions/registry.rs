//! Action registry
//!
//! Maps each action identifier to an independent handler closure. A
//! handler turns the action context into the sequence of platform calls
//! that performs the action; it never touches the platform itself.

use std::collections::{BTreeMap, HashMap};

use crate::permissions::{Permission, PermissionError};
use crate::platform::{PlatformError, TabInfo};

use super::calls::{
    PageScript, PlatformCall, ScrollEdge, TabMove, TabSelection, TabTarget, WindowState, ZoomChange,
};
use super::catalog::ActionId;

/// Everything a handler may look at
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub action: ActionId,
    pub tab: &'a TabInfo,
    pub params: &'a BTreeMap<String, String>,
}

impl<'a> ActionContext<'a> {
    /// A required, non-blank parameter
    pub fn param(&self, name: &'static str) -> Result<&'a str, ActionError> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ActionError::MissingParam {
                action: self.action,
                param: name,
            })
    }

    /// An optional parameter parsed into `T`
    pub fn parsed_param<T: std::str::FromStr>(
        &self,
        name: &'static str,
        default: T,
    ) -> Result<T, ActionError> {
        match self.params.get(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ActionError::InvalidParam {
                action: self.action,
                param: name,
                value: raw.clone(),
            }),
        }
    }
}

/// Errors that can occur while performing an action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("{action} needs the '{param}' parameter")]
    MissingParam { action: ActionId, param: &'static str },

    #[error("{action}: invalid value '{value}' for '{param}'")]
    InvalidParam {
        action: ActionId,
        param: &'static str,
        value: String,
    },

    #[error("no page is available")]
    NoPage,

    #[error("the page has no {0}")]
    TabInfoMissing(&'static str),

    #[error("cannot run on browser pages ({0})")]
    RestrictedPage(String),

    #[error("no handler registered for {0}")]
    NotRegistered(ActionId),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

type HandlerFn =
    Box<dyn Fn(&ActionContext<'_>) -> Result<Vec<PlatformCall>, ActionError> + Send + Sync>;

/// A registered action handler
pub struct Handler {
    /// Permissions needed beyond those implied by the emitted calls
    pub requires: &'static [Permission],
    run: HandlerFn,
}

impl Handler {
    pub fn calls(&self, ctx: &ActionContext<'_>) -> Result<Vec<PlatformCall>, ActionError> {
        (self.run)(ctx)
    }
}

/// Lookup table of action handlers
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<ActionId, Handler>,
}

impl ActionRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any existing one for `action`
    pub fn register<F>(&mut self, action: ActionId, requires: &'static [Permission], run: F)
    where
        F: Fn(&ActionContext<'_>) -> Result<Vec<PlatformCall>, ActionError> + Send + Sync + 'static,
    {
        self.handlers.insert(
            action,
            Handler {
                requires,
                run: Box::new(run),
            },
        );
    }

    /// Register an action that always emits the same single call
    fn fixed(&mut self, action: ActionId, call: PlatformCall) {
        self.register(action, &[], move |_| Ok(vec![call.clone()]));
    }

    fn page_script(&mut self, action: ActionId, script: PageScript) {
        self.fixed(action, PlatformCall::RunPageScript { script });
    }

    pub fn get(&self, action: ActionId) -> Option<&Handler> {
        self.handlers.get(&action)
    }

    /// Registry with every built-in action
    pub fn with_builtins() -> Self {
        use ActionId::*;

        let mut r = Self::new();

        // navigation
        r.fixed(Back, PlatformCall::NavigateHistory { delta: -1 });
        r.fixed(Forward, PlatformCall::NavigateHistory { delta: 1 });
        r.fixed(Reload, PlatformCall::Reload { bypass_cache: false });
        r.fixed(HardReload, PlatformCall::Reload { bypass_cache: true });
        r.register(ClearCacheAndReload, &[], |_| {
            Ok(vec![PlatformCall::ClearCache, PlatformCall::Reload { bypass_cache: true }])
        });
        r.page_script(ScrollToTop, PageScript::ScrollTo { edge: ScrollEdge::Top });
        r.page_script(ScrollToBottom, PageScript::ScrollTo { edge: ScrollEdge::Bottom });

        // tabs
        r.fixed(NewTab, PlatformCall::CreateTab { url: None });
        r.fixed(CloseTab, PlatformCall::CloseTab);
        r.fixed(NextTab, PlatformCall::ActivateTab { target: TabTarget::Next });
        r.fixed(PrevTab, PlatformCall::ActivateTab { target: TabTarget::Previous });
        r.fixed(FirstTab, PlatformCall::ActivateTab { target: TabTarget::First });
        r.fixed(LastTab, PlatformCall::ActivateTab { target: TabTarget::Last });
        r.fixed(ReopenClosedTab, PlatformCall::RestoreSession);
        r.fixed(DuplicateTab, PlatformCall::DuplicateTab);
        r.fixed(PinTab, PlatformCall::TogglePinned);
        r.fixed(MuteTab, PlatformCall::ToggleTabMuted);
        r.fixed(MoveTabLeft, PlatformCall::MoveTab { to: TabMove::Left });
        r.fixed(MoveTabRight, PlatformCall::MoveTab { to: TabMove::Right });
        r.fixed(MoveTabToStart, PlatformCall::MoveTab { to: TabMove::Start });
        r.fixed(MoveTabToEnd, PlatformCall::MoveTab { to: TabMove::End });
        r.fixed(CloseOtherTabs, PlatformCall::CloseTabs { which: TabSelection::Others });
        r.fixed(CloseTabsToRight, PlatformCall::CloseTabs { which: TabSelection::ToRight });
        r.fixed(DetachTab, PlatformCall::DetachTab);

        // windows
        r.fixed(NewWindow, PlatformCall::CreateWindow { incognito: false });
        r.fixed(NewIncognitoWindow, PlatformCall::CreateWindow { incognito: true });
        r.fixed(CloseWindow, PlatformCall::CloseWindow);
        r.fixed(Fullscreen, PlatformCall::SetWindowState { state: WindowState::ToggleFullscreen });
        r.fixed(MinimizeWindow, PlatformCall::SetWindowState { state: WindowState::Minimized });
        r.fixed(MaximizeWindow, PlatformCall::SetWindowState { state: WindowState::Maximized });

        // browser pages
        for (action, page) in [
            (OpenBookmarks, "chrome://bookmarks/"),
            (OpenHistory, "chrome://history/"),
            (OpenDownloads, "chrome://downloads/"),
            (OpenExtensions, "chrome://extensions/"),
            (OpenSettings, "chrome://settings/"),
        ] {
            r.fixed(
                action,
                PlatformCall::OpenUrl {
                    url: page.to_string(),
                    new_tab: true,
                },
            );
        }

        // clipboard
        r.register(CopyUrl, &[Permission::Tabs], |ctx| {
            if ctx.tab.url.is_empty() {
                return Err(ActionError::NoPage);
            }
            Ok(vec![PlatformCall::WriteClipboard {
                text: ctx.tab.url.clone(),
            }])
        });
        r.register(CopyTitle, &[Permission::Tabs], |ctx| {
            let title = ctx
                .tab
                .title
                .clone()
                .ok_or(ActionError::TabInfoMissing("title"))?;
            Ok(vec![PlatformCall::WriteClipboard { text: title }])
        });
        r.page_script(CopyAllLinks, PageScript::CopyAllLinks);
        r.page_script(CopySelection, PageScript::CopySelection);
        r.page_script(PasteAndGo, PageScript::PasteAndGo);

        // media
        r.page_script(PlayPause, PageScript::PlayPause);
        r.page_script(MuteUnmute, PageScript::ToggleMute);
        r.register(VolumeUp, &[], |ctx| {
            Ok(vec![PlatformCall::RunPageScript {
                script: PageScript::AdjustVolume { step_percent: step(ctx)? },
            }])
        });
        r.register(VolumeDown, &[], |ctx| {
            Ok(vec![PlatformCall::RunPageScript {
                script: PageScript::AdjustVolume { step_percent: -step(ctx)? },
            }])
        });

        // page
        r.register(IncreaseFontSize, &[], |ctx| {
            Ok(vec![PlatformCall::RunPageScript {
                script: PageScript::AdjustFontSize { step_percent: step(ctx)? },
            }])
        });
        r.register(DecreaseFontSize, &[], |ctx| {
            Ok(vec![PlatformCall::RunPageScript {
                script: PageScript::AdjustFontSize { step_percent: -step(ctx)? },
            }])
        });
        r.page_script(ResetFontSize, PageScript::ResetFontSize);
        r.fixed(ZoomIn, PlatformCall::Zoom { change: ZoomChange::In });
        r.fixed(ZoomOut, PlatformCall::Zoom { change: ZoomChange::Out });
        r.fixed(ZoomReset, PlatformCall::Zoom { change: ZoomChange::Reset });
        r.page_script(ToggleDarkMode, PageScript::ToggleDarkMode);
        r.page_script(ToggleReaderMode, PageScript::ToggleReaderMode);
        r.page_script(CloseCookieNotices, PageScript::CloseCookieNotices);
        r.fixed(FocusAddressBar, PlatformCall::FocusAddressBar);
        r.page_script(PrintPage, PageScript::Print);

        // custom
        r.register(OpenUrl, &[], |ctx| {
            let url = normalize_url(ctx.param("url")?).ok_or_else(|| ActionError::InvalidParam {
                action: ctx.action,
                param: "url",
                value: ctx.params.get("url").cloned().unwrap_or_default(),
            })?;
            let new_tab = ctx.parsed_param("newTab", true)?;
            Ok(vec![PlatformCall::OpenUrl { url, new_tab }])
        });
        r.register(CustomScript, &[], |ctx| {
            let code = ctx.param("code")?;
            Ok(vec![PlatformCall::ExecuteCode {
                code: code.to_string(),
            }])
        });
        r.register(FillForm, &[], |ctx| {
            let value = ctx.param("value")?;
            Ok(vec![PlatformCall::RunPageScript {
                script: PageScript::FillForm {
                    value: value.to_string(),
                },
            }])
        });

        r
    }
}

/// Percentage step for volume and font size actions, 1 to 100
fn step(ctx: &ActionContext<'_>) -> Result<i32, ActionError> {
    let step: u8 = ctx.parsed_param("step", 10)?;
    if !(1..=100).contains(&step) {
        return Err(ActionError::InvalidParam {
            action: ctx.action,
            param: "step",
            value: step.to_string(),
        });
    }
    Ok(i32::from(step))
}

/// Accept bare hosts by assuming https
fn normalize_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    url::Url::parse(&candidate).ok().map(String::from)
}
