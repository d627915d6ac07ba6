use async_trait::async_trait;
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::mpsc;
use trackrak_core::PageSnapshot;
use trackrak_widget::{ControlSignal, PanelView, WidgetHost};

/// Widget host that draws panels on stdout and simulates the page with a
/// URL plus markup loaded from disk.
pub struct ConsoleHost {
    page: RwLock<PageSnapshot>,
    signals: mpsc::Sender<ControlSignal>,
}

impl ConsoleHost {
    pub fn new(page: PageSnapshot, signals: mpsc::Sender<ControlSignal>) -> Self {
        Self {
            page: RwLock::new(page),
            signals,
        }
    }

    pub fn set_page(&self, page: PageSnapshot) {
        tracing::debug!(url = %page.url, bytes = page.html.len(), "Console page replaced");
        match self.page.write() {
            Ok(mut current) => *current = page,
            Err(poisoned) => *poisoned.into_inner() = page,
        }
    }
}

#[async_trait]
impl WidgetHost for ConsoleHost {
    fn mount(&self) {
        println!("┌─ TrackRak ─────────────────────────");
    }

    fn unmount(&self) {
        println!("└─ (closed)");
    }

    fn render(&self, view: &PanelView) {
        println!("{}", format_view(view));
    }

    async fn current_page(&self) -> PageSnapshot {
        match self.page.read() {
            Ok(page) => page.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn open_in_new_context(&self, url: &str) {
        tracing::info!(url, "Opening activation page in a new tab");
        println!("│ -> new tab: {}", url);
    }

    fn schedule_reload(&self, after: Duration) {
        let signals = self.signals.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if signals.send(ControlSignal::Reload).await.is_err() {
                tracing::debug!("Reload dropped, signal channel closed");
            }
        });
    }
}

/// Plain-text rendering of a panel, one `│`-prefixed line per element.
pub fn format_view(view: &PanelView) -> String {
    let mut lines = Vec::new();
    if view.login_form {
        lines.push("│ [email] [password]".to_string());
    }
    if !view.text.is_empty() {
        lines.push(format!("│ {}", view.text));
    }
    if let Some(percent) = view.progress_percent {
        let filled = (usize::from(percent) / 5).min(20);
        lines.push(format!("│ [{}{}] {}%", "#".repeat(filled), ".".repeat(20 - filled), percent));
    }
    if let Some(action) = view.action {
        lines.push(format!("│ < {} >", action.label()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackrak_widget::PanelAction;

    #[test]
    fn test_format_progress_panel() {
        let view = PanelView {
            text: "2 / 4 activated. Current: Target".into(),
            action: None,
            login_form: false,
            progress_percent: Some(50),
        };
        assert_eq!(
            format_view(&view),
            "│ 2 / 4 activated. Current: Target\n│ [##########..........] 50%"
        );
    }

    #[test]
    fn test_format_login_panel() {
        let view = PanelView {
            text: String::new(),
            action: Some(PanelAction::Login),
            login_form: true,
            progress_percent: None,
        };
        assert_eq!(format_view(&view), "│ [email] [password]\n│ < Login >");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_arrives_as_signal() {
        let (tx, mut rx) = mpsc::channel(1);
        let host = ConsoleHost::new(PageSnapshot::default(), tx);

        host.schedule_reload(Duration::from_millis(800));
        assert_eq!(rx.recv().await, Some(ControlSignal::Reload));
    }

    #[tokio::test]
    async fn test_page_can_be_replaced() {
        let (tx, _rx) = mpsc::channel(1);
        let host = ConsoleHost::new(PageSnapshot::new("https://example.com", ""), tx);
        host.set_page(PageSnapshot::new("https://www.rakuten.com/in-store", "<html></html>"));

        assert_eq!(host.current_page().await.url, "https://www.rakuten.com/in-store");
    }
}
