use clap::Parser;
use std::path::PathBuf;

/// TrackRak console: drive the in-store offer widget from a terminal
#[derive(Parser, Debug)]
#[command(name = "trackrak")]
#[command(about = "Activate Rakuten In-Store offers from a terminal", long_about = None)]
pub struct Cli {
    /// URL of the page the widget starts on (defaults to widget.activation_page_url)
    #[arg(long)]
    pub url: Option<String>,

    /// Saved markup of that page, used to read the signed-in session
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Open the widget on start even if it was dismissed before
    #[arg(long)]
    pub open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["trackrak"]);
        assert!(cli.url.is_none());
        assert!(cli.html.is_none());
        assert!(!cli.open);
    }

    #[test]
    fn test_page_arguments() {
        let cli = Cli::parse_from([
            "trackrak",
            "--url",
            "https://www.rakuten.com/in-store",
            "--html",
            "page.html",
            "--open",
        ]);
        assert_eq!(cli.url.as_deref(), Some("https://www.rakuten.com/in-store"));
        assert_eq!(cli.html, Some(PathBuf::from("page.html")));
        assert!(cli.open);
    }
}
