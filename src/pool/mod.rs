//! Fixed-size simulation worker pool.
//!
//! Workers are plain threads pulling jobs off one shared FIFO queue, so an
//! idle worker always picks up the oldest pending request. Correlation is
//! structural: every submitted job carries its own response channel, and the
//! caller holds the matching receiver. Results complete in whatever order
//! workers finish; only the per-request channel pairing is guaranteed.

mod messages;

pub use messages::{RequestKind, WorkRequest, WorkResponse, WorkResult};

use crate::error::SimError;
use crate::sim::{run_batch, FragmentSummary, RunSample, StageSummary};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// A queued request plus the channel its result goes back on.
struct Job {
    request: WorkRequest,
    reply: Sender<Result<WorkResult, SimError>>,
}

/// Fixed pool of stateless simulation workers.
pub struct SimPool {
    queue: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    shutting_down: Arc<AtomicBool>,
}

impl SimPool {
    /// Spawn `size` workers. At least one is required.
    pub fn new(size: usize) -> Result<Self, SimError> {
        if size == 0 {
            return Err(SimError::EmptyPool);
        }

        let (queue, jobs) = channel::<Job>();
        let jobs = Arc::new(Mutex::new(jobs));
        let shutting_down = Arc::new(AtomicBool::new(false));

        let workers = (0..size)
            .map(|worker_idx| {
                let jobs = Arc::clone(&jobs);
                let shutting_down = Arc::clone(&shutting_down);
                thread::spawn(move || worker_loop(worker_idx, &jobs, &shutting_down))
            })
            .collect();

        Ok(Self {
            queue: Some(queue),
            workers,
            shutting_down,
        })
    }

    /// Queue a request. The returned receiver yields exactly this request's
    /// result; receivers may be consumed in any order.
    pub fn submit(
        &self,
        request: WorkRequest,
    ) -> Result<Receiver<Result<WorkResult, SimError>>, SimError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(SimError::PoolClosed);
        }
        let queue = self.queue.as_ref().ok_or(SimError::PoolClosed)?;

        let (reply, response) = channel();
        queue
            .send(Job { request, reply })
            .map_err(|_| SimError::PoolClosed)?;
        Ok(response)
    }

    /// Submit and block for the result.
    pub fn execute(&self, request: WorkRequest) -> Result<WorkResult, SimError> {
        let response = self.submit(request)?;
        response
            .recv()
            .map_err(|_| SimError::Worker("response channel closed".to_string()))?
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting work and join every worker. Requests still queued are
    /// rejected, not executed.
    pub fn shutdown(&mut self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        // Dropping the sender wakes idle workers out of recv.
        self.queue.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for SimPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(worker_idx: usize, jobs: &Mutex<Receiver<Job>>, shutting_down: &AtomicBool) {
    loop {
        // Hold the lock only for the dequeue, not the work.
        let job = {
            let guard = match jobs.lock() {
                Ok(guard) => guard,
                Err(_) => break,
            };
            guard.recv()
        };
        let job = match job {
            Ok(job) => job,
            Err(_) => break,
        };

        if shutting_down.load(Ordering::SeqCst) {
            let _ = job.reply.send(Err(SimError::PoolClosed));
            continue;
        }

        debug!(
            "worker {} handling {:?} ({} runs from floor {})",
            worker_idx, job.request.kind, job.request.run_count, job.request.starting_floor
        );
        // The caller may have dropped its receiver; that is not an error.
        let _ = job.reply.send(handle_request(&job.request));
    }
}

/// Run the request's batch and apply its reduction.
fn handle_request(request: &WorkRequest) -> Result<WorkResult, SimError> {
    let runs = run_batch(
        &request.stats,
        &request.options,
        &request.card_config,
        request.starting_floor,
        request.run_count,
        request.seed,
    );

    match request.kind {
        RequestKind::StageSummary => Ok(WorkResult::StageSummary(StageSummary::from_runs(&runs))),
        RequestKind::FragmentSummary => {
            let target = request.target_fragment.ok_or_else(|| {
                SimError::Worker("fragmentSummary request without targetFragment".to_string())
            })?;
            Ok(WorkResult::FragmentSummary(FragmentSummary::from_runs(
                &runs, target,
            )))
        }
        RequestKind::StageLite => Ok(WorkResult::StageLite(
            runs.iter().map(RunSample::from).collect(),
        )),
    }
}
