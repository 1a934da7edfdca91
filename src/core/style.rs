//! Basemap swaps and the one-shot replay that follows them.
//!
//! Swapping the base style wipes every source and layer from the renderer.
//! Each swap registers a pending replay keyed by its style URL; when the
//! renderer reports that style as ready, the engine takes the replay, runs
//! one full reconciliation and completes the caller's [`StyleReplay`].
//! A newer swap drops the older replay, which resolves as canceled.

use crate::{
    core::config::StyleConfig,
    layers::reconciler::ReconcileReport,
    rendering::renderer::MapRenderer,
    ui::theme::Theme,
    Error, Result,
};
use futures::channel::oneshot;
use futures::FutureExt;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

pub use futures::channel::oneshot::Canceled;

/// Resolves with the report of the replay pass, or `Canceled` when a newer
/// swap superseded this one.
#[derive(Debug)]
pub struct StyleReplay {
    generation: u64,
    style_url: String,
    receiver: oneshot::Receiver<ReconcileReport>,
}

impl StyleReplay {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn style_url(&self) -> &str {
        &self.style_url
    }
}

impl Future for StyleReplay {
    type Output = std::result::Result<ReconcileReport, Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver.poll_unpin(cx)
    }
}

/// A registered replay waiting for its style to finish loading
#[derive(Debug)]
pub struct PendingReplay {
    pub generation: u64,
    pub style_url: String,
    sender: oneshot::Sender<ReconcileReport>,
}

impl PendingReplay {
    pub fn complete(self, report: ReconcileReport) {
        if self.sender.send(report).is_err() {
            log::debug!("replay {} finished with nobody waiting", self.generation);
        }
    }
}

#[derive(Debug)]
pub struct StyleSwitchController {
    current_theme: String,
    generation: u64,
    pending: Option<PendingReplay>,
}

impl StyleSwitchController {
    pub fn new(initial_theme: impl Into<String>) -> Self {
        Self {
            current_theme: initial_theme.into(),
            generation: 0,
            pending: None,
        }
    }

    pub fn current_theme(&self) -> &str {
        &self.current_theme
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_style(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.style_url.as_str())
    }

    /// Swaps the base style to `theme` and registers its replay
    pub fn request<R>(
        &mut self,
        renderer: &mut R,
        theme: &str,
        config: &StyleConfig,
    ) -> Result<StyleReplay>
    where
        R: MapRenderer + ?Sized,
    {
        let theme = Theme::find(theme).ok_or_else(|| Error::UnknownTheme(theme.to_string()))?;
        let style_url = config.style_url(theme.value);

        renderer.swap_base_style(&style_url)?;

        self.generation += 1;
        self.current_theme = theme.value.to_string();
        let (sender, receiver) = oneshot::channel();
        let superseded = self.pending.replace(PendingReplay {
            generation: self.generation,
            style_url: style_url.clone(),
            sender,
        });
        if let Some(old) = superseded {
            log::info!(
                "style swap {} to {} superseded before it loaded",
                old.generation,
                old.style_url
            );
        }
        log::info!("swapping base style to {} (swap {})", style_url, self.generation);

        Ok(StyleReplay {
            generation: self.generation,
            style_url,
            receiver,
        })
    }

    /// Takes the pending replay if `style` is the one it waits for
    pub fn take_ready(&mut self, style: &str) -> Option<PendingReplay> {
        match &self.pending {
            Some(pending) if pending.style_url == style => self.pending.take(),
            Some(pending) => {
                log::debug!(
                    "ignoring ready signal for {} while waiting for {}",
                    style,
                    pending.style_url
                );
                None
            }
            None => None,
        }
    }
}

impl Default for StyleSwitchController {
    fn default() -> Self {
        Self::new(crate::core::constants::DEFAULT_THEME)
    }
}
