use async_trait::async_trait;
use std::time::Duration;
use trackrak_core::PageSnapshot;

use crate::view::PanelView;

/// The page environment the widget lives in.
///
/// `mount`/`unmount` toggle the panel's presence; `render` replaces its
/// content. The controller never calls `render` while unmounted.
#[async_trait]
pub trait WidgetHost: Send + Sync {
    fn mount(&self);

    fn unmount(&self);

    fn render(&self, view: &PanelView);

    /// Location and markup of the page as it is right now
    async fn current_page(&self) -> PageSnapshot;

    fn open_in_new_context(&self, url: &str);

    /// Reload the page once `after` has elapsed
    fn schedule_reload(&self, after: Duration);
}

/// Requests that arrive from outside the panel (toolbar, background worker)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Reopen,
    Close,
    /// The page finished reloading
    Reload,
}
