//! Background mirroring of local trendline mutations to the REST backend.
//!
//! The session never waits on the network. It pushes a [`SyncOp`] into an
//! unbounded channel and a spawned task replays the operations in order
//! against [`BackendApi`]. Failures are logged and dropped.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use trendline_api::{BackendApi, NewTrendline, TrendlinePatch};

use crate::drawing::{Trendline, TrendlineId};

/// A mutation to replay on the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOp {
    Create(Trendline),
    Update(Trendline),
    Delete(TrendlineId),
    Clear,
}

impl SyncOp {
    pub fn name(&self) -> &'static str {
        match self {
            SyncOp::Create(_) => "create",
            SyncOp::Update(_) => "update",
            SyncOp::Delete(_) => "delete",
            SyncOp::Clear => "clear",
        }
    }
}

/// Sending half of the mirror. Dropping it stops the task after the queue drains.
#[derive(Debug, Clone)]
pub struct RemoteMirror {
    tx: mpsc::UnboundedSender<SyncOp>,
}

impl RemoteMirror {
    /// Spawn the mirror task on the current tokio runtime.
    pub fn spawn(api: BackendApi) -> (Self, JoinHandle<()>) {
        let (mirror, rx) = Self::channel();
        let handle = tokio::spawn(run(api, rx));
        (mirror, handle)
    }

    /// Mirror backed by a bare channel; the caller consumes the operations.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SyncOp>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, op: SyncOp) {
        let name = op.name();
        if self.tx.send(op).is_err() {
            log::warn!("remote sync stopped, dropping {name}");
        }
    }
}

async fn run(api: BackendApi, mut rx: mpsc::UnboundedReceiver<SyncOp>) {
    let mut remote_ids: HashMap<TrendlineId, i64> = HashMap::new();
    log::debug!("remote sync started against {}", api.client().config().base_url);

    while let Some(op) = rx.recv().await {
        let name = op.name();
        if let Err(e) = apply(&api, &mut remote_ids, op).await {
            log::warn!("remote {name} failed: {e}");
        }
    }
    log::debug!("remote sync stopped");
}

async fn apply(
    api: &BackendApi,
    remote_ids: &mut HashMap<TrendlineId, i64>,
    op: SyncOp,
) -> trendline_api::Result<()> {
    let trendlines = api.trendlines();
    match op {
        SyncOp::Create(line) => {
            let record = trendlines.create(&new_record(&line)).await?;
            remote_ids.insert(line.id, record.id);
        }
        SyncOp::Update(line) => match remote_ids.get(&line.id).copied() {
            Some(remote) => {
                let patch = TrendlinePatch::endpoints(
                    line.start.timestamp,
                    line.start.price,
                    line.end.timestamp,
                    line.end.price,
                );
                trendlines.update(remote, &patch).await?;
            }
            // Loaded from local storage before the mirror knew about it.
            None => {
                let record = trendlines.create(&new_record(&line)).await?;
                remote_ids.insert(line.id, record.id);
            }
        },
        SyncOp::Delete(id) => match remote_ids.remove(&id) {
            Some(remote) => trendlines.delete(remote).await?,
            None => log::debug!("trendline {id} was never mirrored, nothing to delete"),
        },
        SyncOp::Clear => {
            let removed = trendlines.delete_all().await?;
            remote_ids.clear();
            log::info!("cleared {removed} remote trendlines");
        }
    }
    Ok(())
}

fn new_record(line: &Trendline) -> NewTrendline {
    NewTrendline::new(
        line.start.timestamp,
        line.start.price,
        line.end.timestamp,
        line.end.price,
    )
    .with_color(line.color.clone())
}
