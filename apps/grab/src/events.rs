//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{style, Term};
use grab_events::{AppEvent, CacheEvent, DownloadEvent, EventMessage, ExtractEvent};

/// Renders events as human-readable status lines on stderr
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// Suppress rendering; events are only logged
    quiet: bool,
    /// A progress line is currently drawn and must be cleared first
    progress_active: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            quiet,
            progress_active: false,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);

        if self.quiet {
            return;
        }

        if let AppEvent::Download(DownloadEvent::Progress {
            bytes_downloaded,
            total_bytes,
            ..
        }) = &message.event
        {
            self.show_progress(*bytes_downloaded, *total_bytes);
            return;
        }

        match status_line(&message.event) {
            Some(StatusLine::Status(text)) => self.show_status(&text),
            Some(StatusLine::Success(text)) => self.show_success(&text),
            Some(StatusLine::Warning(text)) => self.show_warning(&text),
            Some(StatusLine::Error(text)) => self.show_error(&text),
            None => {}
        }
    }

    fn show_progress(&mut self, bytes_downloaded: u64, total_bytes: Option<u64>) {
        let line = match total_bytes {
            Some(total) if total > 0 => {
                let percent = bytes_downloaded.saturating_mul(100) / total;
                format!(
                    "  {} / {} ({percent}%)",
                    format_bytes(bytes_downloaded),
                    format_bytes(total)
                )
            }
            _ => format!("  {}", format_bytes(bytes_downloaded)),
        };
        if self.progress_active {
            self.term.clear_line().ok();
        }
        self.term.write_str(&line).ok();
        self.progress_active = true;
    }

    fn show_status(&mut self, message: &str) {
        self.write_line(message.to_string());
    }

    fn show_success(&mut self, message: &str) {
        let line = if self.colors_enabled {
            format!("{} {message}", style("✓").green())
        } else {
            format!("✓ {message}")
        };
        self.write_line(line);
    }

    fn show_warning(&mut self, message: &str) {
        let line = if self.colors_enabled {
            format!("{} {message}", style("!").yellow())
        } else {
            format!("! {message}")
        };
        self.write_line(line);
    }

    fn show_error(&mut self, message: &str) {
        let line = if self.colors_enabled {
            format!("{} {}", style("✗").red(), style(message).red())
        } else {
            format!("✗ {message}")
        };
        self.write_line(line);
    }

    fn write_line(&mut self, line: String) {
        if self.progress_active {
            self.term.clear_line().ok();
            self.progress_active = false;
        }
        self.term.write_line(&line).ok();
    }
}

/// A rendered event, tagged with how it is styled
#[derive(Debug, PartialEq, Eq)]
enum StatusLine {
    Status(String),
    Success(String),
    Warning(String),
    Error(String),
}

/// Text shown for an event, if it is shown at all
fn status_line(event: &AppEvent) -> Option<StatusLine> {
    let line = match event {
        AppEvent::Download(DownloadEvent::Started { url, total_bytes }) => {
            let size = total_bytes.map(format_bytes).unwrap_or_default();
            StatusLine::Status(format!("Downloading {url} {size}"))
        }
        AppEvent::Download(DownloadEvent::Completed {
            bytes_downloaded, ..
        }) => StatusLine::Success(format!("Downloaded {}", format_bytes(*bytes_downloaded))),
        AppEvent::Download(DownloadEvent::Failed { url, failure }) => {
            StatusLine::Error(format!("Download of {url} failed: {}", failure.message))
        }
        AppEvent::Cache(CacheEvent::Hit { filename, .. }) => {
            StatusLine::Success(format!("{filename} is cached"))
        }
        AppEvent::Cache(CacheEvent::Stale { filename, .. }) => {
            StatusLine::Warning(format!("{filename} is cached with a different digest"))
        }
        AppEvent::Cache(CacheEvent::Mismatch {
            expected, actual, ..
        }) => StatusLine::Error(format!(
            "SHA256 mismatch. Actual: {actual}, expected: {expected}"
        )),
        AppEvent::Extract(ExtractEvent::CacheHit { path }) => {
            StatusLine::Success(format!("{} exists, return from cache.", path.display()))
        }
        AppEvent::Extract(ExtractEvent::Started { archive, .. }) => {
            StatusLine::Status(format!("Extracting {}", archive.display()))
        }
        AppEvent::Extract(ExtractEvent::Completed { entries, .. }) => {
            StatusLine::Success(format!("Extracted {entries} entries"))
        }
        AppEvent::Extract(ExtractEvent::Failed { failure, .. }) => {
            StatusLine::Error(format!("Extraction failed: {}", failure.message))
        }
        _ => return None,
    };
    Some(line)
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
