//! Streaming subscriptions: status, groups, log, clash mode.

use std::sync::Arc;

use sfa_core::{
    Command, CommandClient, CommandEndpoint, ConnectionState, Event, EventForwarder,
    SessionConfig, SocketEndpoint,
};
use tracing::debug;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Events that count toward `--count`.
fn is_payload(event: &Event) -> bool {
    !matches!(
        event,
        Event::Connected | Event::Disconnected(_) | Event::LogCleared
    )
}

pub async fn handle(
    command: Command,
    args: &WatchArgs,
    endpoint: SocketEndpoint,
    session: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let endpoint = Arc::new(endpoint);
    let (forwarder, mut events) = EventForwarder::channel();
    let client = CommandClient::builder(Arc::clone(&endpoint), command, Arc::new(forwarder))
        .config(session)
        .build();
    let mut state = client.connection_state();

    debug!(%command, endpoint = %endpoint.describe(), "starting subscription");
    client.connect();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut remaining = args.count;
    let result = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break Ok(()),
            changed = state.changed() => {
                if changed.is_err() {
                    break Err(CliError::Internal("session state channel closed".into()));
                }
                let failed = *state.borrow_and_update() == ConnectionState::Failed;
                if failed {
                    break client.wait_connected().await.map_err(CliError::from);
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                let rendered = match output::render_event(global.output, &event) {
                    Ok(rendered) => rendered,
                    Err(err) => break Err(err),
                };
                output::print_output(&rendered, global.quiet);

                if matches!(event, Event::Disconnected(_)) {
                    break Ok(());
                }
                if is_payload(&event) {
                    if let Some(left) = remaining.as_mut() {
                        *left = left.saturating_sub(1);
                        if *left == 0 {
                            break Ok(());
                        }
                    }
                }
            }
        }
    };

    client.shutdown().await;
    result
}
