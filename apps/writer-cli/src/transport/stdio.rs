//! Standard I/O transport for the editing session
//!
//! IMPORTANT: All logging MUST go to stderr. stdout is reserved for
//! protocol events only.

use anyhow::Context;
use shared_types::Span;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use writer_session::EditingSession;

use crate::protocol::{Event, Request};

/// Run `session` over the process's stdin and stdout
pub async fn run_stdio_session(session: EditingSession) -> anyhow::Result<()> {
    tracing::info!("Starting stdio transport");
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_session(session, stdin, stdout).await
}

/// Serve requests from `reader` until EOF or `shutdown`, pushing published
/// analyses to `writer` as they arrive
pub async fn run_session<R, W>(
    mut session: EditingSession,
    reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut results = session.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read request")? else {
                    tracing::info!("EOF reached, shutting down");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let request = match serde_json::from_str::<Request>(&line) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::warn!(error = %e, "Invalid request");
                        write_event(&mut writer, &Event::error("parse", e)).await?;
                        continue;
                    }
                };
                if request == Request::Shutdown {
                    tracing::info!("Shutdown requested");
                    break;
                }

                tracing::debug!(op = request.op(), "Received request");
                for event in handle_request(&mut session, request).await {
                    write_event(&mut writer, &event).await?;
                }
            }
            result = results.recv() => match result {
                Ok(result) => {
                    if session.apply_analysis(&result) {
                        if let Some(analysis) = session.analysis() {
                            write_event(&mut writer, &Event::Analysis(analysis.clone())).await?;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Analysis subscriber lagged");
                }
                Err(RecvError::Closed) => {
                    tracing::warn!("Scheduler stopped");
                    break;
                }
            },
        }
    }

    session.shutdown().await;
    Ok(())
}

/// Handle one request and return the events to send back
pub async fn handle_request(session: &mut EditingSession, request: Request) -> Vec<Event> {
    let op = request.op();
    match request {
        Request::Edit { text } => vec![Event::Ack {
            op: op.to_string(),
            version: session.edit(text),
        }],
        Request::Accept {
            issue_id,
            replacement,
        } => match session.accept(&issue_id, replacement) {
            Ok(_) => vec![document_event(session)],
            Err(e) => vec![Event::error(op, e)],
        },
        Request::Learn { issue_id, word } => {
            let learned = match (issue_id, word) {
                (Some(issue_id), _) => session.learn(&issue_id).map(|word| (word, true)),
                (None, Some(word)) => session
                    .add_to_dictionary(&word)
                    .map(|added| (word, added)),
                (None, None) => return vec![Event::error(op, "learn needs issue_id or word")],
            };
            match learned {
                Ok((word, added)) => with_analysis(session, Event::Dictionary { word, added }),
                Err(e) => vec![Event::error(op, e)],
            }
        }
        Request::Forget { word } => match session.remove_from_dictionary(&word) {
            Ok(_) => vec![Event::Dictionary { word, added: false }],
            Err(e) => vec![Event::error(op, e)],
        },
        Request::FixAll => {
            session.fix_all();
            with_analysis(session, document_event(session))
        }
        Request::Format => {
            session.auto_format().await;
            with_analysis(session, document_event(session))
        }
        Request::Replace { start, end, text } => {
            match session.replace_selection(Span::new(start, end), &text) {
                Ok(_) => vec![document_event(session)],
                Err(e) => vec![Event::error(op, e)],
            }
        }
        Request::Rewrite { start, end, mode } => {
            match session.rewrite_selection(Span::new(start, end), mode) {
                Ok(_) => vec![document_event(session)],
                Err(e) => vec![Event::error(op, e)],
            }
        }
        Request::Synonyms { word } => {
            let synonyms = session
                .synonyms(&word)
                .iter()
                .map(|s| s.to_string())
                .collect();
            vec![Event::Synonyms { word, synonyms }]
        }
        Request::Status => vec![Event::Status(session.status())],
        Request::Shutdown => Vec::new(),
    }
}

fn document_event(session: &EditingSession) -> Event {
    Event::Document {
        version: session.document().version(),
        text: session.document().text().to_string(),
    }
}

/// `event` followed by the session's current analysis, if any
fn with_analysis(session: &EditingSession, event: Event) -> Vec<Event> {
    let mut events = vec![event];
    if let Some(analysis) = session.analysis() {
        events.push(Event::Analysis(analysis.clone()));
    }
    events
}

async fn write_event<W: AsyncWrite + Unpin>(writer: &mut W, event: &Event) -> anyhow::Result<()> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
