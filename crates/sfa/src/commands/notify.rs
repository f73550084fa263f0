//! Terminal rendition of the service notification.
//!
//! Liveness comes from stdin, one signal per line: `on` / `off` (also
//! `screen_on` / `screen_off`).

use std::sync::Arc;

use futures_util::{Stream, StreamExt, future};
use serde_json::json;
use sfa_config::Config;
use sfa_core::{Liveness, NotificationSurface, ServiceNotification, SessionConfig, SocketEndpoint};
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::warn;

use crate::cli::{GlobalOpts, NotifyArgs, OutputFormat};
use crate::error::CliError;
use crate::output::print_output;

// ── Surface ──────────────────────────────────────────────────────────

struct TerminalSurface {
    format: OutputFormat,
    quiet: bool,
}

impl TerminalSurface {
    fn emit(&self, text: String, record: serde_json::Value) {
        match self.format {
            OutputFormat::Text => print_output(&text, self.quiet),
            OutputFormat::Json => print_output(&record.to_string(), self.quiet),
        }
    }
}

impl NotificationSurface for TerminalSurface {
    fn show(&self, title: &str, content: &str) {
        self.emit(
            format!("[{title}] {content}"),
            json!({ "notification": "show", "title": title, "content": content }),
        );
    }

    fn update(&self, content: &str) {
        self.emit(
            content.to_owned(),
            json!({ "notification": "update", "content": content }),
        );
    }

    fn remove(&self) {
        self.emit(
            "notification removed".into(),
            json!({ "notification": "remove" }),
        );
    }
}

// ── Liveness input ───────────────────────────────────────────────────

fn parse_liveness(line: &str) -> Option<Liveness> {
    match line.trim().to_ascii_lowercase().as_str() {
        "on" | "screen_on" | "active" => Some(Liveness::Active),
        "off" | "screen_off" | "inactive" => Some(Liveness::Inactive),
        "" => None,
        other => {
            warn!(input = other, "ignoring unknown liveness signal");
            None
        }
    }
}

fn stdin_signals() -> impl Stream<Item = Liveness> + Send + 'static {
    FramedRead::new(tokio::io::stdin(), LinesCodec::new()).filter_map(|line| {
        future::ready(match line {
            Ok(line) => parse_liveness(&line),
            Err(err) => {
                warn!(error = %err, "failed to read liveness input");
                None
            }
        })
    })
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    args: &NotifyArgs,
    cfg: &Config,
    endpoint: SocketEndpoint,
    session: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let dynamic = cfg.dynamic_notification && !args.static_only;
    let surface = Arc::new(TerminalSurface {
        format: global.output,
        quiet: global.quiet,
    });

    let mut notification = ServiceNotification::new(Arc::new(endpoint), surface, session, dynamic);
    notification.show(&args.profile_name, stdin_signals());

    let interrupted = tokio::signal::ctrl_c().await;
    notification.close();
    interrupted?;
    Ok(())
}
