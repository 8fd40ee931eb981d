//! Providers: independently ticking producers and consumers of the world
//! model
//!
//! Each provider runs on its own named thread and works on a private mirror
//! of the world. It receives snapshots from the coordinator through an
//! ingress slot and hands its mirror back through an egress slot; the
//! coordinator only copies back the fields the provider owns.
//!
//! ```text
//! coordinator ──put──▶ [ingress] ──▶ provider thread
//!      ▲                                  │ pre_run once
//!      │                                  │ loop: absorb snapshot, run
//!      └──────try_take── [egress] ◀──put──┘ post_run once
//! ```
//!
//! Both slots hold at most one snapshot; putting into a full slot replaces
//! the older value.

mod planner;
mod radio;
mod referee;
mod simulator;
mod vision;

pub use planner::PlannerProvider;
pub use radio::RadioProvider;
pub use referee::RefereeProvider;
pub use simulator::SimulatorProvider;
pub use vision::{VisionProvider, apply_detection, decode_detection};

use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use maidan::WorldModel;
use maidan::world::WorldField;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Longest a provider blocks waiting for a fresh snapshot.
pub const SNAPSHOT_WAIT: Duration = Duration::from_secs(1);

// ============================================================================
// Provider trait
// ============================================================================

/// Which provider a thread runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Vision,
    Referee,
    Radio,
    Planner,
    Simulator,
}

impl ProviderKind {
    /// Thread and log component name
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Vision => "vision",
            ProviderKind::Referee => "referee",
            ProviderKind::Radio => "radio",
            ProviderKind::Planner => "planner",
            ProviderKind::Simulator => "simulator",
        }
    }

    /// World fields this kind of provider writes.
    pub fn owned_fields(self) -> &'static [WorldField] {
        match self {
            ProviderKind::Vision | ProviderKind::Simulator => WorldField::POSITIONS,
            ProviderKind::Referee => WorldField::REFEREE,
            ProviderKind::Radio => WorldField::STATUS,
            ProviderKind::Planner => WorldField::COMMANDS,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A component with a private world mirror.
///
/// `pre_run` runs once before the loop, `run` once per iteration after the
/// latest snapshot has been absorbed, `post_run` once on the way out
/// (including after a failure).
pub trait Provider: Send {
    fn kind(&self) -> ProviderKind;

    fn owned_fields(&self) -> &'static [WorldField] {
        self.kind().owned_fields()
    }

    fn pre_run(&mut self, _world: &mut WorldModel) -> Result<()> {
        Ok(())
    }

    fn run(&mut self, world: &mut WorldModel) -> Result<()>;

    fn post_run(&mut self, _world: &mut WorldModel) {}
}

// ============================================================================
// Snapshot slots
// ============================================================================

/// Capacity-1 mailbox where a newer snapshot replaces an unread older one.
#[derive(Clone)]
pub struct SnapshotSlot {
    tx: Sender<WorldModel>,
    rx: Receiver<WorldModel>,
}

impl Default for SnapshotSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSlot {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    /// Non-blocking put. Returns true if an unread snapshot was dropped.
    pub fn put(&self, snapshot: WorldModel) -> bool {
        let mut value = snapshot;
        let mut dropped = false;
        loop {
            match self.tx.try_send(value) {
                Ok(()) => return dropped,
                Err(TrySendError::Full(v)) => {
                    dropped |= self.rx.try_recv().is_ok();
                    value = v;
                }
                // Unreachable while we hold a receiver
                Err(TrySendError::Disconnected(_)) => return dropped,
            }
        }
    }

    /// Non-blocking take
    pub fn try_take(&self) -> Option<WorldModel> {
        self.rx.try_recv().ok()
    }

    /// Blocking take bounded by `timeout`
    pub fn take_timeout(&self, timeout: Duration) -> Option<WorldModel> {
        match self.rx.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

// ============================================================================
// Provider threads
// ============================================================================

/// Coordinator-side view of a running provider.
pub struct ProviderHandle {
    kind: ProviderKind,
    owned: &'static [WorldField],
    pub ingress: SnapshotSlot,
    pub egress: SnapshotSlot,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ProviderHandle {
    /// Start `provider` on its own thread with `initial` as its first mirror.
    pub fn spawn(
        mut provider: Box<dyn Provider>,
        initial: WorldModel,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let kind = provider.kind();
        let owned = provider.owned_fields();
        let ingress = SnapshotSlot::new();
        let egress = SnapshotSlot::new();
        let finished = Arc::new(AtomicBool::new(false));

        let thread_ingress = ingress.clone();
        let thread_egress = egress.clone();
        let thread_finished = Arc::clone(&finished);
        let thread = thread::Builder::new()
            .name(kind.name().to_string())
            .spawn(move || {
                run_loop(
                    provider.as_mut(),
                    initial,
                    &thread_ingress,
                    &thread_egress,
                    &stop,
                );
                thread_finished.store(true, Ordering::Release);
            })
            .map_err(|e| Error::Spawn(format!("{} provider: {}", kind, e)))?;

        log::info!("Started {} provider", kind);
        Ok(Self {
            kind,
            owned,
            ingress,
            egress,
            finished,
            thread: Some(thread),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn owned_fields(&self) -> &'static [WorldField] {
        self.owned
    }

    /// The provider thread has left its loop.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Wait for the provider thread to exit.
    pub fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("{} provider thread panicked", self.kind);
            }
        }
    }
}

/// Body of a provider thread.
///
/// Runs until `stop` is set or `run` fails; `post_run` always runs.
pub fn run_loop(
    provider: &mut dyn Provider,
    initial: WorldModel,
    ingress: &SnapshotSlot,
    egress: &SnapshotSlot,
    stop: &AtomicBool,
) {
    let kind = provider.kind();
    let owned = provider.owned_fields();
    let mut world = initial;

    if let Err(e) = provider.pre_run(&mut world) {
        log::error!("{} provider failed to start: {}", kind, e);
        provider.post_run(&mut world);
        return;
    }
    egress.put(world.clone());

    while !stop.load(Ordering::Relaxed) {
        if let Some(snapshot) = ingress.take_timeout(SNAPSHOT_WAIT) {
            world.absorb_snapshot(snapshot, owned);
        }
        if stop.load(Ordering::Relaxed) {
            break;
        }
        if let Err(e) = provider.run(&mut world) {
            log::error!("{} provider stopped: {}", kind, e);
            break;
        }
        egress.put(world.clone());
    }

    provider.post_run(&mut world);
    // Drain anything the coordinator left for us
    while ingress.try_take().is_some() {}
    log::info!("{} provider exited", kind);
}
