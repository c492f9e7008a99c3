//! Text formatting for prices, times, slopes and the console view.

use std::time::{Duration, Instant};

use chrono::DateTime;

use crate::drawing::Trendline;
use crate::events::Notification;
use crate::session::Observer;

/// Price label: `$0.1234`, `$12.34` or `$43,251`.
pub fn format_price(price: f64) -> String {
    let sign = if price < 0.0 { "-" } else { "" };
    let abs = price.abs();
    if abs < 1.0 {
        format!("{sign}${abs:.4}")
    } else if abs < 100.0 {
        format!("{sign}${abs:.2}")
    } else {
        format!("{sign}${}", group_thousands(abs.round() as u64))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `HH:MM` in UTC.
pub fn format_time(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Signed percent change with two decimals, e.g. `+1.16%`.
pub fn format_slope(line: &Trendline) -> String {
    match line.slope_percent() {
        Some(pct) => format!("{pct:+.2}%"),
        None => "n/a".to_string(),
    }
}

/// One-line description used by the list and selection views.
pub fn describe(line: &Trendline) -> String {
    format!(
        "{}  {} {} -> {} {}  slope {}",
        line.id,
        format_time(line.start.timestamp),
        format_price(line.start.price),
        format_time(line.end.timestamp),
        format_price(line.end.price),
        format_slope(line),
    )
}

pub fn header(symbol: &str, trendlines: usize, last_close: Option<f64>) -> String {
    let price = last_close.map(format_price).unwrap_or_else(|| "--".to_string());
    let noun = if trendlines == 1 { "trendline" } else { "trendlines" };
    format!("{symbol}  {price}  |  {trendlines} {noun}")
}

/// Tracks the last data update for the "updated ... ago" label.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateClock {
    last: Option<Instant>,
}

impl UpdateClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, at: Instant) {
        self.last = Some(at);
    }

    pub fn label(&self, now: Instant) -> String {
        match self.last {
            Some(last) => since_label(now.saturating_duration_since(last)),
            None => "Waiting for data".to_string(),
        }
    }
}

fn since_label(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    match secs {
        0..=1 => "Just now".to_string(),
        2..=59 => format!("{secs} seconds ago"),
        60..=119 => "1 minute ago".to_string(),
        _ => format!("{} minutes ago", secs / 60),
    }
}

/// Prints notifications to stdout.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    symbol: String,
    trendlines: usize,
    last_close: Option<f64>,
}

impl ConsoleObserver {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Lines to print for `note`.
    pub fn render(&mut self, note: &Notification) -> Vec<String> {
        match note {
            Notification::DataUpdated {
                symbol, last_close, ..
            } => {
                self.symbol = symbol.clone();
                self.last_close = *last_close;
                vec![header(&self.symbol, self.trendlines, self.last_close)]
            }
            Notification::TrendlinesChanged(lines) => {
                self.trendlines = lines.len();
                let mut out = vec![header(&self.symbol, self.trendlines, self.last_close)];
                out.extend(lines.iter().map(|line| format!("  {}", describe(line))));
                out
            }
            Notification::SelectionChanged(Some(line)) => vec![format!("selected {}", describe(line))],
            Notification::SelectionChanged(None) => vec!["selection cleared".to_string()],
            Notification::DrawingStateChanged(true) => {
                vec!["drawing: click the start point, then the end point".to_string()]
            }
            Notification::DrawingStateChanged(false) => vec!["drawing off".to_string()],
            Notification::HoverChanged(Some(target)) => {
                vec![format!("over {} {}", target.trendline_id, target.endpoint.name())]
            }
            Notification::HoverChanged(None) => Vec::new(),
        }
    }
}

impl Observer for ConsoleObserver {
    fn notify(&mut self, note: &Notification) {
        for line in self.render(note) {
            println!("{line}");
        }
    }
}
