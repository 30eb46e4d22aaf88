//! Off-thread optimizer execution.
//!
//! [`OptimizerService`] owns a worker task that receives jobs over a bounded
//! channel and runs each optimization on the blocking pool, so a long run
//! never stalls the caller's executor. The worker is started on the first
//! request and stopped by [`OptimizerService::shutdown`] or on drop.
//!
//! Without a tokio runtime the service runs the optimizer inline; the
//! result is the same.
//!
//! ```text
//! caller ──Job{request, reply}──▶ mpsc ──▶ worker ──spawn_blocking──▶ optimizer
//!    ▲                                                                   │
//!    └──────────────────────── oneshot reply ◀───────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::{Config, ServiceConfig};
use crate::error::ServiceError;
use crate::models::Show;
use crate::scheduler::{OptimizeRequest, OptimizeResult, ShowOrderOptimizer};
use crate::validation::validate_entities;

type Reply = Result<OptimizeResult, ServiceError>;

struct Job {
    request: OptimizeRequest,
    reply: oneshot::Sender<Reply>,
}

struct Worker {
    jobs: mpsc::Sender<Job>,
    handle: JoinHandle<()>,
}

/// Runs optimizations on a dedicated worker.
pub struct OptimizerService {
    optimizer: ShowOrderOptimizer,
    config: ServiceConfig,
    worker: Mutex<Option<Worker>>,
    closed: AtomicBool,
}

impl OptimizerService {
    /// Creates a service; no worker is started yet.
    pub fn new(optimizer: ShowOrderOptimizer, config: ServiceConfig) -> Self {
        Self {
            optimizer,
            config,
            worker: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a service from the full configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ShowOrderOptimizer::from_config(&config.optimizer),
            config.service.clone(),
        )
    }

    /// Whether a worker task is currently alive.
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Runs one optimization.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Unavailable`] after [`shutdown`](Self::shutdown)
    /// - [`ServiceError::TimedOut`] when the configured timeout elapses
    /// - [`ServiceError::WorkerCrashed`] when the run panicked or the worker
    ///   went away mid-request
    pub async fn optimize(&self, request: OptimizeRequest) -> Reply {
        if self.closed.load(Ordering::Acquire) {
            return Err(ServiceError::Unavailable);
        }
        report_validation(&request);

        if Handle::try_current().is_err() {
            debug!(sequence = request.sequence, "no runtime; optimizing inline");
            return Ok(self.optimizer.optimize_request(&request));
        }

        let jobs = self.ensure_worker()?;
        let sequence = request.sequence;
        let (reply, response) = oneshot::channel();

        jobs.send(Job { request, reply })
            .await
            .map_err(|_| ServiceError::Unavailable)?;
        debug!(sequence, "optimization queued");

        match tokio::time::timeout(self.config.timeout(), response).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                warn!(sequence, "optimizer worker dropped the request");
                Err(ServiceError::WorkerCrashed("reply channel closed".into()))
            }
            Err(_) => {
                warn!(sequence, timeout_ms = self.config.timeout_ms, "optimization timed out");
                Err(ServiceError::TimedOut(self.config.timeout_ms))
            }
        }
    }

    /// Runs one optimization on the calling thread.
    pub fn optimize_blocking(&self, request: &OptimizeRequest) -> Reply {
        if self.closed.load(Ordering::Acquire) {
            return Err(ServiceError::Unavailable);
        }
        report_validation(request);
        Ok(self.optimizer.optimize_request(request))
    }

    /// Optimizes a show and applies the result.
    ///
    /// Returns whether the result was applied; a newer result applied in
    /// the meantime wins. On error the show's order is left as it was.
    pub async fn reoptimize(&self, show: &mut Show) -> Result<bool, ServiceError> {
        let request = show.request();
        let result = self.optimize(request).await?;
        Ok(show.apply(result))
    }

    /// Stops the worker. Queued jobs are still answered; later requests
    /// fail with [`ServiceError::Unavailable`].
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if worker.is_some() {
            debug!("optimizer worker shutting down");
        }
    }

    fn ensure_worker(&self) -> Result<mpsc::Sender<Job>, ServiceError> {
        let mut slot = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.closed.load(Ordering::Acquire) {
            return Err(ServiceError::Unavailable);
        }

        if let Some(worker) = slot.as_ref().filter(|w| !w.handle.is_finished()) {
            return Ok(worker.jobs.clone());
        }

        let (jobs, inbox) = mpsc::channel(self.config.channel_capacity.max(1));
        let handle = tokio::spawn(run_worker(self.optimizer.clone(), inbox));
        debug!(capacity = self.config.channel_capacity, "optimizer worker started");
        *slot = Some(Worker {
            jobs: jobs.clone(),
            handle,
        });
        Ok(jobs)
    }
}

impl Drop for OptimizerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for OptimizerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerService")
            .field("optimizer", &self.optimizer)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn run_worker(optimizer: ShowOrderOptimizer, mut inbox: mpsc::Receiver<Job>) {
    while let Some(Job { request, reply }) = inbox.recv().await {
        let sequence = request.sequence;
        let optimizer = optimizer.clone();

        let outcome = tokio::task::spawn_blocking(move || optimizer.optimize_request(&request))
            .await
            .map_err(|e| {
                error!(sequence, error = %e, "optimization failed");
                ServiceError::WorkerCrashed(e.to_string())
            });

        if reply.send(outcome).is_err() {
            debug!(sequence, "caller gone; result dropped");
        }
    }
    debug!("optimizer worker stopped");
}

fn report_validation(request: &OptimizeRequest) {
    if let Err(errors) = validate_entities(&request.entities, request.min_gap) {
        for e in &errors {
            warn!(sequence = request.sequence, kind = ?e.kind, "{}", e.message);
        }
    }
}
