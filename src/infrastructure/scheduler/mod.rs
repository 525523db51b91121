//! Background synthesis scheduler.
//!
//! Cache misses are handed to a bounded pool of workers so the HTTP handler
//! can answer with `generating` right away. A fingerprint is admitted at most
//! once while it is queued or running; duplicates are acknowledged without
//! a second dispatch.

use crate::domain::tts::{SynthesisError, SynthesisRequest};
use crate::infrastructure::engines::SpeechSynthesizer;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Terminal state of a tracked job
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Ready { audio_url: String },
    Failed { error: String },
}

/// Durable home of job records
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn complete_job(
        &self,
        owner: &str,
        job_id: &str,
        outcome: JobOutcome,
    ) -> anyhow::Result<()>;
}

/// Identifies the job record a background synthesis reports to
#[derive(Debug, Clone)]
pub struct JobTicket {
    pub owner: String,
    pub job_id: String,
    pub audio_url: String,
}

pub struct SynthesisScheduler {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    permits: Arc<Semaphore>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    tracker: TaskTracker,
}

/// Releases a fingerprint from the in-flight set when dropped
struct Admission {
    in_flight: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.key);
    }
}

impl SynthesisScheduler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, max_concurrent: usize) -> Self {
        Self {
            synthesizer,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            tracker: TaskTracker::new(),
        }
    }

    /// Queue a synthesis. `None` means the same fingerprint is already queued
    /// or running; the caller's artifact will appear when that one finishes.
    pub fn schedule(
        &self,
        request: SynthesisRequest,
        output: PathBuf,
    ) -> Option<JoinHandle<Result<(), SynthesisError>>> {
        let admission = self.admit(&request)?;
        let synthesizer = self.synthesizer.clone();
        let permits = self.permits.clone();

        tracing::debug!(
            engine = %request.engine(),
            fingerprint = %admission.key,
            "Synthesis scheduled"
        );

        Some(self.tracker.spawn(async move {
            let _admission = admission;
            run_queued(synthesizer, permits, request, output).await
        }))
    }

    /// Queue a synthesis whose result is recorded on a job. The job receives
    /// exactly one terminal update, even when the engine panics.
    pub fn schedule_job(
        &self,
        ticket: JobTicket,
        request: SynthesisRequest,
        output: PathBuf,
        jobs: Arc<dyn JobStore>,
    ) -> JoinHandle<()> {
        // Jobs always run; a duplicate in flight only means this one may find
        // the artifact already published once it gets a permit.
        let admission = self.admit(&request);
        let synthesizer = self.synthesizer.clone();
        let permits = self.permits.clone();
        let inner_tracker = self.tracker.clone();

        self.tracker.spawn(async move {
            let worker = inner_tracker.spawn(async move {
                let _admission = admission;
                run_queued(synthesizer, permits, request, output).await
            });

            let outcome = match worker.await {
                Ok(Ok(())) => JobOutcome::Ready {
                    audio_url: ticket.audio_url.clone(),
                },
                Ok(Err(e)) => JobOutcome::Failed {
                    error: e.to_string(),
                },
                Err(e) => JobOutcome::Failed {
                    error: format!("synthesis task aborted: {}", e),
                },
            };

            tracing::info!(
                owner = %ticket.owner,
                job_id = %ticket.job_id,
                outcome = ?outcome,
                "Background job finished"
            );

            if let Err(e) = jobs
                .complete_job(&ticket.owner, &ticket.job_id, outcome)
                .await
            {
                tracing::error!(
                    owner = %ticket.owner,
                    job_id = %ticket.job_id,
                    error = %e,
                    "Failed to record job outcome, job stays generating"
                );
            }
        })
    }

    /// Synthesize in the caller's task, sharing the worker pool
    pub async fn run_now(
        &self,
        request: &SynthesisRequest,
        output: &std::path::Path,
    ) -> Result<(), SynthesisError> {
        let _permit = acquire(&self.permits).await?;
        self.synthesizer.synthesize(request, output).await
    }

    pub fn is_in_flight(&self, request: &SynthesisRequest) -> bool {
        self.in_flight
            .lock()
            .contains(request.fingerprint().as_str())
    }

    /// Stop accepting work and wait for everything queued to finish
    pub async fn shutdown(&self) {
        self.tracker.close();
        tracing::info!(pending = self.tracker.len(), "Waiting for background syntheses");
        self.tracker.wait().await;
    }

    fn admit(&self, request: &SynthesisRequest) -> Option<Admission> {
        let key = request.fingerprint().to_string();
        if !self.in_flight.lock().insert(key.clone()) {
            tracing::debug!(fingerprint = %key, "Synthesis already in flight");
            return None;
        }
        Some(Admission {
            in_flight: self.in_flight.clone(),
            key,
        })
    }
}

async fn run_queued(
    synthesizer: Arc<dyn SpeechSynthesizer>,
    permits: Arc<Semaphore>,
    request: SynthesisRequest,
    output: PathBuf,
) -> Result<(), SynthesisError> {
    let _permit = acquire(&permits).await?;

    // Another writer may have published this artifact while we queued
    if tokio::fs::try_exists(&output).await.unwrap_or(false) {
        tracing::debug!(path = %output.display(), "Artifact appeared while queued");
        return Ok(());
    }

    synthesizer.synthesize(&request, &output).await
}

async fn acquire(permits: &Arc<Semaphore>) -> Result<OwnedSemaphorePermit, SynthesisError> {
    permits.clone().acquire_owned().await.map_err(|_| {
        SynthesisError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "synthesis pool closed",
        ))
    })
}
