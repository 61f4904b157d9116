// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::common::{PurchaseEvent, SessionId};
use crate::config::ImpactConfig;
use crate::session::SessionState;
use crate::Error;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Number of messages allowed to be in cross-spawn channel before backpressure
/// is applied to writer.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Upper bound (exclusive) on the number of workers a SessionManager can spawn.
pub const MAX_WORKERS: usize = u16::MAX as usize;

/// This is designed to be run in a `tokio::spawn` and will constantly pull the rx stream
/// and record the given purchase on its session. When the stream is closed it will collect all
/// the final `SessionState`s into a single vector.
async fn process_session_purchases(
    mut rx: mpsc::Receiver<PurchaseEvent>,
    config: Arc<ImpactConfig>,
) -> Result<Vec<SessionState>, Error> {
    let mut state_for_session = HashMap::<SessionId, SessionState>::new();
    while let Some(event) = rx.recv().await {
        let state = state_for_session
            .entry(event.session)
            .or_insert_with(|| SessionState::new(event.session));
        state.record_purchase(
            &config,
            event.category,
            event.brand,
            event.price,
            event.timestamp,
        );
    }
    Ok(state_for_session.into_values().collect())
}

type WorkerHandle = (
    mpsc::Sender<PurchaseEvent>,
    JoinHandle<Result<Vec<SessionState>, Error>>,
);

/// SessionManager owns the state of every session and fans purchases out onto N workers.
/// A session is always routed to the same worker, so each purchase log has exactly one writer
/// and purchases of a session are applied in the order they were sent. Sessions on different
/// workers never share state.
///
/// Sending purchases does not require any locks, thus many immutable references to this
/// struct can be used if many sources need to stream purchases.
pub struct SessionManager {
    workers: Vec<WorkerHandle>,
}

impl SessionManager {
    /// Construct a new SessionManager.
    ///
    /// `num_workers` represents the number of workers spawned in the background to do the
    /// processing. Every worker prices purchases with the same `config`.
    pub fn new(num_workers: usize, config: ImpactConfig) -> Self {
        assert!(
            num_workers > 0,
            "`num_workers` must be at least 1 in SessionManager"
        );
        assert!(
            num_workers < MAX_WORKERS,
            "`num_workers` must be less than MAX_WORKERS in SessionManager"
        );
        let config = Arc::new(config);
        let mut workers = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
            workers.push((
                tx,
                tokio::spawn(process_session_purchases(rx, config.clone())),
            ));
        }
        Self { workers }
    }

    /// Sends a purchase to the worker that owns its session.
    pub async fn process_purchase(&self, event: PurchaseEvent) -> Result<(), Error> {
        let worker_index = (event.session as usize) % self.workers.len();
        self.workers[worker_index].0.send(event).await?;
        Ok(())
    }

    /// Closes all the workers and returns a VecDeque of all session states.
    pub async fn collect_session_states(self) -> Result<VecDeque<SessionState>, Error> {
        let mut session_states = VecDeque::new();
        for (sender, join_handle) in self.workers {
            drop(sender); // Close our channel.
            session_states.append(&mut VecDeque::from(join_handle.await??));
        }
        Ok(session_states)
    }
}
