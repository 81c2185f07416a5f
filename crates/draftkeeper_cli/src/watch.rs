//! `dkeep watch`: treat a local file as the editor and autosave it.

use crate::client::{ApiClient, HttpPersist};
use draftkeeper_core::{
    spawn_autosave, AutosaveOptions, DocumentId, SaveOutcome, SaveState, SaveStatus,
};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub(crate) struct WatchArgs {
    pub(crate) id: String,
    pub(crate) file: PathBuf,
    pub(crate) poll: Duration,
    pub(crate) options: AutosaveOptions,
    pub(crate) json: bool,
}

/// Read the draft file. A missing file means there is nothing to save yet.
async fn read_draft(path: &Path) -> io::Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

pub(crate) fn format_status(status: &SaveStatus, json: bool) -> String {
    if json {
        return serde_json::to_string(status).unwrap_or_default();
    }
    let label = match status.state {
        SaveState::Idle => "idle",
        SaveState::PendingChange => "unsaved changes",
        SaveState::Saving => "saving...",
        SaveState::Saved => "saved",
        SaveState::Error => "save failed",
    };
    let mut line = label.to_string();
    if let Some(saved_at) = status.last_saved_at {
        line.push_str(&format!(" (last saved {})", saved_at.format("%H:%M:%S")));
    }
    if let Some(error) = &status.last_error {
        if status.state == SaveState::Error {
            line.push_str(&format!(": {}", error));
        }
    }
    line
}

async fn print_status(mut rx: watch::Receiver<SaveStatus>, json: bool) {
    while rx.changed().await.is_ok() {
        let status = rx.borrow_and_update().clone();
        eprintln!("{}", format_status(&status, json));
    }
}

/// Watch `args.file` until `shutdown` resolves, then flush the final content.
///
/// # Errors
/// Returns an error when the edit lock or the stored document cannot be
/// fetched. Failures of individual saves are reported, not returned.
pub(crate) async fn run_watch(
    client: ApiClient,
    args: WatchArgs,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Box<dyn std::error::Error>> {
    client.acquire_lock(&args.id).await?;
    let stored = client.get_document(&args.id).await?.map(|doc| doc.content);

    let handle = spawn_autosave(
        DocumentId::new(args.id.as_str()),
        stored,
        args.options,
        HttpPersist::new(client.clone()),
    );
    let printer = tokio::spawn(print_status(handle.subscribe(), args.json));
    eprintln!(
        "watching {} as '{}' (owner {})",
        args.file.display(),
        args.id,
        client.owner().unwrap_or("anonymous")
    );

    let mut last_seen: Option<String> = None;
    let mut ticker = tokio::time::interval(args.poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => match read_draft(&args.file).await {
                Ok(Some(content)) if last_seen.as_ref() != Some(&content) => {
                    handle.notify_edit(content.clone());
                    last_seen = Some(content);
                }
                Ok(_) => {}
                Err(err) => tracing::warn!("failed to read {}: {}", args.file.display(), err),
            },
        }
    }

    let final_content = match read_draft(&args.file).await {
        Ok(Some(content)) => Some(content),
        _ => last_seen,
    };
    if let Some(content) = final_content {
        match handle.save_now(content).await {
            Ok(SaveOutcome::Saved) => eprintln!("final draft saved"),
            Ok(SaveOutcome::Unchanged) => eprintln!("nothing to save"),
            Ok(outcome) => eprintln!("final draft not saved: {:?}", outcome),
            Err(err) => eprintln!("final save failed: {}", err),
        }
    }

    handle.dispose();
    printer.abort();
    if let Err(err) = client.release_lock(&args.id).await {
        tracing::warn!("failed to release edit lock for '{}': {}", args.id, err);
    }
    Ok(())
}
