//! Single-owner task for the working set
//!
//! The [`WorksetActor`] owns the [`Workset`] and applies commands one at a
//! time. Any task (scan engine callbacks, the value refresher, a console)
//! talks to it through a cloneable [`WorksetHandle`].

use super::Workset;
use crate::analysis::offsets::{analyze, OffsetAnalysis};
use crate::core::types::{Address, AddressEntry, ScanHit, ValueType, WorksetResult};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Point-in-time copy of the working set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorksetSnapshot {
    pub entries: Vec<AddressEntry>,
    pub selected: Vec<Address>,
}

/// Requests handled by the owner task
#[derive(Debug)]
pub enum WorksetCommand {
    ReplaceAll(Vec<AddressEntry>),
    Insert {
        entry: AddressEntry,
        reply: oneshot::Sender<WorksetResult<()>>,
    },
    Update {
        entry: AddressEntry,
        reply: oneshot::Sender<WorksetResult<()>>,
    },
    Rename {
        address: Address,
        name: String,
        reply: oneshot::Sender<WorksetResult<()>>,
    },
    SetFrozen {
        address: Address,
        frozen: bool,
        reply: oneshot::Sender<WorksetResult<()>>,
    },
    Delete(Address),
    ApplyValues(Vec<(Address, String)>),
    Toggle {
        address: Address,
        selected: bool,
    },
    SelectAll,
    DeselectAll,
    InvertSelection,
    Snapshot(oneshot::Sender<WorksetSnapshot>),
    ReadTargets(oneshot::Sender<Vec<(Address, ValueType)>>),
    AnalyzeSelection(oneshot::Sender<OffsetAnalysis>),
}

/// Owner of a [`Workset`], draining a command queue
pub struct WorksetActor {
    workset: Workset,
    receiver: mpsc::Receiver<WorksetCommand>,
}

impl WorksetActor {
    /// Creates the actor and a handle to it
    pub fn new(workset: Workset, queue_depth: usize) -> (Self, WorksetHandle) {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        (WorksetActor { workset, receiver }, WorksetHandle { sender })
    }

    /// Spawns the actor on the current runtime
    pub fn spawn(workset: Workset, queue_depth: usize) -> (tokio::task::JoinHandle<Workset>, WorksetHandle) {
        let (actor, handle) = WorksetActor::new(workset, queue_depth);
        (tokio::spawn(actor.run()), handle)
    }

    /// Applies commands until every handle is dropped, then returns the workset
    pub async fn run(mut self) -> Workset {
        info!("workset owner started");
        while let Some(command) = self.receiver.recv().await {
            self.handle(command);
        }
        info!(entries = self.workset.registry().len(), "workset owner stopped");
        self.workset
    }

    fn handle(&mut self, command: WorksetCommand) {
        let ws = &mut self.workset;
        // Replies are best effort: the requester may have gone away
        match command {
            WorksetCommand::ReplaceAll(entries) => ws.replace_all(entries),
            WorksetCommand::Insert { entry, reply } => {
                let _ = reply.send(ws.insert(entry));
            }
            WorksetCommand::Update { entry, reply } => {
                let _ = reply.send(ws.update(entry));
            }
            WorksetCommand::Rename {
                address,
                name,
                reply,
            } => {
                let _ = reply.send(ws.rename(address, name));
            }
            WorksetCommand::SetFrozen {
                address,
                frozen,
                reply,
            } => {
                let _ = reply.send(ws.set_frozen(address, frozen));
            }
            WorksetCommand::Delete(address) => ws.delete(address),
            WorksetCommand::ApplyValues(values) => ws.apply_values(values),
            WorksetCommand::Toggle { address, selected } => ws.toggle(address, selected),
            WorksetCommand::SelectAll => ws.select_all(),
            WorksetCommand::DeselectAll => ws.deselect_all(),
            WorksetCommand::InvertSelection => ws.invert_selection(),
            WorksetCommand::Snapshot(reply) => {
                let snapshot = WorksetSnapshot {
                    entries: ws.entries().to_vec(),
                    selected: ws.selected_items().iter().map(|e| e.address).collect(),
                };
                let _ = reply.send(snapshot);
            }
            WorksetCommand::ReadTargets(reply) => {
                let _ = reply.send(ws.registry().read_targets());
            }
            WorksetCommand::AnalyzeSelection(reply) => {
                let _ = reply.send(analyze(ws.selected_items()));
            }
        }
        debug!(entries = ws.registry().len(), selected = ws.selected_count(), "command applied");
    }
}

/// Cloneable sender side of the owner task
#[derive(Debug, Clone)]
pub struct WorksetHandle {
    sender: mpsc::Sender<WorksetCommand>,
}

impl WorksetHandle {
    /// Sends a raw command
    pub async fn send(&self, command: WorksetCommand) -> WorksetResult<()> {
        self.sender.send(command).await?;
        Ok(())
    }

    /// Replaces the working set with a batch of scan hits
    pub async fn replace_with_hits(&self, hits: Vec<ScanHit>) -> WorksetResult<()> {
        let entries = hits.into_iter().map(AddressEntry::from_hit).collect();
        self.send(WorksetCommand::ReplaceAll(entries)).await
    }

    pub async fn replace_all(&self, entries: Vec<AddressEntry>) -> WorksetResult<()> {
        self.send(WorksetCommand::ReplaceAll(entries)).await
    }

    pub async fn insert(&self, entry: AddressEntry) -> WorksetResult<()> {
        self.request(|reply| WorksetCommand::Insert { entry, reply }).await?
    }

    pub async fn update(&self, entry: AddressEntry) -> WorksetResult<()> {
        self.request(|reply| WorksetCommand::Update { entry, reply }).await?
    }

    pub async fn rename(&self, address: Address, name: impl Into<String>) -> WorksetResult<()> {
        let name = name.into();
        self.request(|reply| WorksetCommand::Rename {
            address,
            name,
            reply,
        })
        .await?
    }

    pub async fn set_frozen(&self, address: Address, frozen: bool) -> WorksetResult<()> {
        self.request(|reply| WorksetCommand::SetFrozen {
            address,
            frozen,
            reply,
        })
        .await?
    }

    pub async fn delete(&self, address: Address) -> WorksetResult<()> {
        self.send(WorksetCommand::Delete(address)).await
    }

    pub async fn apply_values(&self, values: Vec<(Address, String)>) -> WorksetResult<()> {
        self.send(WorksetCommand::ApplyValues(values)).await
    }

    pub async fn toggle(&self, address: Address, selected: bool) -> WorksetResult<()> {
        self.send(WorksetCommand::Toggle { address, selected }).await
    }

    pub async fn select_all(&self) -> WorksetResult<()> {
        self.send(WorksetCommand::SelectAll).await
    }

    pub async fn deselect_all(&self) -> WorksetResult<()> {
        self.send(WorksetCommand::DeselectAll).await
    }

    pub async fn invert_selection(&self) -> WorksetResult<()> {
        self.send(WorksetCommand::InvertSelection).await
    }

    pub async fn snapshot(&self) -> WorksetResult<WorksetSnapshot> {
        self.request(WorksetCommand::Snapshot).await
    }

    pub async fn read_targets(&self) -> WorksetResult<Vec<(Address, ValueType)>> {
        self.request(WorksetCommand::ReadTargets).await
    }

    /// Offset analysis over the currently selected entries
    pub async fn analyze_selection(&self) -> WorksetResult<OffsetAnalysis> {
        self.request(WorksetCommand::AnalyzeSelection).await
    }

    async fn request<T, F>(&self, build: F) -> WorksetResult<T>
    where
        F: FnOnce(oneshot::Sender<T>) -> WorksetCommand,
    {
        let (reply, response) = oneshot::channel();
        self.sender.send(build(reply)).await?;
        Ok(response.await?)
    }
}
