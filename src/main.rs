//! remote-list demo console.
//!
//! Drives a list controller against an in-memory knowledge-file source:
//! prerequisite filter, paging, search, a superseded request, an
//! optimistic patch and status polling until parsing completes.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use remote_list::config::ListConfig;
use remote_list::controller::{ControllerOptions, ControllerState, RemoteListController};
use remote_list::domain::FilterPatch;
use remote_list::fetch::MemorySource;
use remote_list::service::{SelectionSet, StatusPoller};

fn seed_files() -> Vec<Value> {
    (1..=23)
        .map(|i| {
            json!({
                "id": i,
                "name": if i % 4 == 0 { format!("report-{i}.pdf") } else { format!("faq-{i}.md") },
                "library": if i % 3 == 0 { "kb-2" } else { "kb-1" },
                "status": "done",
            })
        })
        .collect()
}

fn is_parsing(row: &Value) -> bool {
    row.get("status") == Some(&json!("parsing"))
}

fn log_state(label: &str, state: &ControllerState<Value>) {
    let names: Vec<&str> = state
        .rows()
        .iter()
        .filter_map(|row| row.get("name").and_then(Value::as_str))
        .collect();
    tracing::info!(
        page = state.page,
        pages = state.page_count(),
        total = state.total,
        loading = state.loading,
        rows = ?names,
        "{label}"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ListConfig::from_env();
    tracing::info!(page_size = config.page_size, "starting remote-list demo");

    let source = Arc::new(MemorySource::json(seed_files()).with_latency(Duration::from_millis(40)));
    let files = Arc::new(RemoteListController::new(
        Arc::clone(&source),
        ControllerOptions::from(&config)
            .with_un_init_data(true)
            .with_cancel_loading_when_reload(true),
    ));

    // Mirror lifecycle events at debug level
    let mut events = files.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::debug!(event = %json, "list event"),
                Err(err) => tracing::debug!(error = %err, "unserializable list event"),
            }
        }
    });

    // Nothing loads until a library is picked
    files.filter_data(FilterPatch::new().set("library", "kb-1")).await?;
    log_state("library kb-1", &files.state());

    files.set_page(2).await?;
    log_state("page 2", &files.state());

    files.search("report").await?;
    log_state("search 'report'", &files.state());

    files.search("").await?;

    // A slow request overtaken by a newer one never lands
    let slow = files.set_page(2);
    let fast = files.set_page(1);
    let (slow, fast) = (slow.await?, fast.await?);
    tracing::info!(?slow, ?fast, "overlapping page requests");

    // Re-upload the first visible file: mark it parsing before the server agrees
    let Some(first_id) = files
        .state()
        .rows()
        .first()
        .and_then(|row| row.get("id").cloned())
    else {
        anyhow::bail!("library kb-1 returned no rows");
    };
    let mut patch = serde_json::Map::new();
    patch.insert("status".to_string(), json!("parsing"));
    let patched = files.refresh_fields(|row| row.get("id") == Some(&first_id), patch);
    tracing::info!(patched, "optimistic status applied");

    source
        .update(
            |row| row.get("id") == Some(&first_id),
            |row| {
                if let Some(fields) = row.as_object_mut() {
                    fields.insert("status".to_string(), json!("parsing"));
                }
            },
        )
        .await;

    let worker = Arc::clone(&source);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let done = worker
            .update(is_parsing, |row| {
                if let Some(fields) = row.as_object_mut() {
                    fields.insert("status".to_string(), json!("done"));
                }
            })
            .await;
        tracing::info!(done, "server finished parsing");
    });

    let mut poller = StatusPoller::spawn(&files, config.poll_interval, |rows: &[Value]| {
        rows.iter().any(is_parsing)
    });
    let stop = poller.wait().await;
    tracing::info!(?stop, "polling finished");
    log_state("after polling", &files.state());

    let mut selection = SelectionSet::new();
    selection.select_page(files.state().rows());
    files.set_page(2).await?;
    selection.select_page(files.state().rows());
    tracing::info!(selected = selection.len(), "selected across two pages");

    Ok(())
}
