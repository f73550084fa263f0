//! Output formatting for session events: human-readable text or one JSON
//! object per line.

use std::io::{self, Write};

use serde::Serialize;
use sfa_core::notification::format_bytes;
use sfa_core::{Event, OutboundGroup, StatusMessage};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── JSON records ─────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Connected,
    Disconnected { reason: Option<&'a str> },
    Status(&'a StatusMessage),
    Groups { groups: &'a [OutboundGroup] },
    LogCleared,
    Log { message: &'a str },
    ClashModeInit { modes: &'a [String], current: &'a str },
    ClashMode { mode: &'a str },
}

impl<'a> From<&'a Event> for Record<'a> {
    fn from(event: &'a Event) -> Self {
        match event {
            Event::Connected => Self::Connected,
            Event::Disconnected(reason) => Self::Disconnected {
                reason: reason.as_deref(),
            },
            Event::Status(status) => Self::Status(status),
            Event::Groups(groups) => Self::Groups { groups },
            Event::LogCleared => Self::LogCleared,
            Event::Log(message) => Self::Log { message },
            Event::ClashModeInit { modes, current } => Self::ClashModeInit { modes, current },
            Event::ClashModeChanged(mode) => Self::ClashMode { mode },
        }
    }
}

// ── Render dispatch ──────────────────────────────────────────────────

/// Render one event in the chosen format.
pub fn render_event(format: OutputFormat, event: &Event) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&Record::from(event))?),
        OutputFormat::Text => Ok(render_text(event)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Text renderers ───────────────────────────────────────────────────

fn render_text(event: &Event) -> String {
    match event {
        Event::Connected => "connected".into(),
        Event::Disconnected(Some(reason)) => format!("disconnected: {reason}"),
        Event::Disconnected(None) => "disconnected".into(),
        Event::Status(status) => render_status(status),
        Event::Groups(groups) => render_groups(groups),
        Event::LogCleared => "--- log cleared ---".into(),
        Event::Log(message) => message.clone(),
        Event::ClashModeInit { modes, current } => {
            format!("modes: {} (current: {current})", modes.join(", "))
        }
        Event::ClashModeChanged(mode) => format!("mode: {mode}"),
    }
}

fn render_status(status: &StatusMessage) -> String {
    let mut line = format!(
        "memory {}  goroutines {}  connections {}/{}",
        format_bytes(status.memory),
        status.goroutines,
        status.connections_in,
        status.connections_out
    );
    if status.traffic_available {
        line.push_str(&format!(
            "  ↑ {}/s ({})  ↓ {}/s ({})",
            format_bytes(status.uplink),
            format_bytes(status.uplink_total),
            format_bytes(status.downlink),
            format_bytes(status.downlink_total)
        ));
    }
    line
}

fn render_groups(groups: &[OutboundGroup]) -> String {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!(
            "{} [{}] -> {}",
            group.tag, group.group_type, group.selected
        ));
        for item in &group.items {
            let marker = if item.tag == group.selected { '*' } else { ' ' };
            let delay = if item.url_test_delay > 0 {
                format!("{}ms", item.url_test_delay)
            } else {
                "-".into()
            };
            lines.push(format!(
                "  {marker} {} ({}) {delay}",
                item.tag, item.outbound_type
            ));
        }
    }
    lines.join("\n")
}
