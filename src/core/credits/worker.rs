//=========================================================================
// Credits Worker
//=========================================================================
//
// Background thread running blocking credits calls.
//
//   CreditsSession ──jobs──► worker thread ──► CreditsApi
//         ▲                        │
//         └────────replies─────────┘
//
// Every job carries the session generation it was issued under so the
// session can drop replies that outlived a sign-out.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::client::{CreditsApi, CreditsError, PurchaseReceipt};

//=== Messages ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum CreditsJob {
    Refresh {
        generation: u64,
        token: String,
    },
    Purchase {
        generation: u64,
        token: String,
        amount: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum CreditsReply {
    Balance {
        generation: u64,
        result: Result<u64, CreditsError>,
    },
    Purchase {
        generation: u64,
        amount: u64,
        result: Result<PurchaseReceipt, CreditsError>,
    },
}

//=== CreditsWorker =======================================================

pub(super) struct CreditsWorker {
    jobs: Option<Sender<CreditsJob>>,
    replies: Receiver<CreditsReply>,
    handle: Option<thread::JoinHandle<()>>,
    in_flight: usize,
}

impl CreditsWorker {
    pub(super) fn spawn(api: Arc<dyn CreditsApi>) -> Self {
        let (job_tx, job_rx) = unbounded::<CreditsJob>();
        let (reply_tx, reply_rx) = unbounded::<CreditsReply>();

        let handle = thread::spawn(move || {
            for job in job_rx {
                let reply = run_job(api.as_ref(), job);
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
            debug!(target: "credits", "Credits worker exiting");
        });

        Self {
            jobs: Some(job_tx),
            replies: reply_rx,
            handle: Some(handle),
            in_flight: 0,
        }
    }

    pub(super) fn submit(&mut self, job: CreditsJob) -> bool {
        let Some(jobs) = self.jobs.as_ref() else {
            return false;
        };
        if jobs.send(job).is_err() {
            warn!(target: "credits", "Credits worker is gone, dropping job");
            return false;
        }
        self.in_flight += 1;
        true
    }

    pub(super) fn try_recv(&mut self) -> Option<CreditsReply> {
        let reply = self.replies.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(reply)
    }

    /// Waits until `deadline` for the next reply.
    pub(super) fn recv_until(&mut self, deadline: Instant) -> Option<CreditsReply> {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(reply)
            }
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.in_flight = 0;
                None
            }
        }
    }

    pub(super) fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for CreditsWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(target: "credits", "Credits worker panicked");
            }
        }
    }
}

fn run_job(api: &dyn CreditsApi, job: CreditsJob) -> CreditsReply {
    let started = Instant::now();
    let reply = match job {
        CreditsJob::Refresh { generation, token } => CreditsReply::Balance {
            generation,
            result: api.fetch_balance(&token),
        },
        CreditsJob::Purchase {
            generation,
            token,
            amount,
        } => CreditsReply::Purchase {
            generation,
            amount,
            result: api.add_credits(&token, amount),
        },
    };
    debug!(target: "credits", "Credits call finished in {:?}", started.elapsed());
    reply
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Fixed;

    impl CreditsApi for Fixed {
        fn fetch_balance(&self, _token: &str) -> Result<u64, CreditsError> {
            Ok(75)
        }

        fn add_credits(&self, _token: &str, _amount: u64) -> Result<PurchaseReceipt, CreditsError> {
            Err(CreditsError::Status(500))
        }
    }

    #[test]
    fn worker_answers_in_submission_order() {
        let mut worker = CreditsWorker::spawn(Arc::new(Fixed));
        assert!(worker.submit(CreditsJob::Refresh {
            generation: 1,
            token: "t".into(),
        }));
        assert!(worker.submit(CreditsJob::Purchase {
            generation: 1,
            token: "t".into(),
            amount: 10,
        }));
        assert_eq!(worker.in_flight(), 2);

        let deadline = Instant::now() + Duration::from_secs(2);
        assert_eq!(
            worker.recv_until(deadline),
            Some(CreditsReply::Balance {
                generation: 1,
                result: Ok(75)
            })
        );
        assert!(matches!(
            worker.recv_until(deadline),
            Some(CreditsReply::Purchase {
                result: Err(CreditsError::Status(500)),
                ..
            })
        ));
        assert_eq!(worker.in_flight(), 0);
    }

    #[test]
    fn drop_joins_worker() {
        let worker = CreditsWorker::spawn(Arc::new(Fixed));
        drop(worker);
    }
}
