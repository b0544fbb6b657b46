//! Optimistic bookmark toggling with per-job request sequencing.
//!
//! A toggle flips the feed flag immediately and records a sequence number
//! for its job. Every successful response advances the job's last confirmed
//! flag (newest sequence wins). A failed latest toggle shows the last
//! confirmed flag again, never an unconfirmed optimistic one. Responses to
//! older toggles only touch the feed once nothing newer for that job is in
//! flight.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::api_client::JobsApi;
use crate::errors::AppError;
use crate::feed::JobFeed;
use crate::models::JobId;
use crate::notifications::{Notification, Notifications};

/// A toggle that has been applied locally and is awaiting the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub job_id: JobId,
    pub seq: u64,
    pub previous: bool,
    pub desired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Backend confirmed the latest toggle.
    Confirmed,
    /// A newer toggle was issued meanwhile; this response did not decide
    /// the shown flag on its own.
    Superseded,
}

/// Sequencing state for one job.
#[derive(Debug, Default)]
struct Track {
    latest: u64,
    in_flight: BTreeSet<u64>,
    confirmed: bool,
    confirmed_seq: u64,
}

impl Track {
    fn newer_in_flight(&self, seq: u64) -> bool {
        self.in_flight.range(seq + 1..).next().is_some()
    }
}

pub struct BookmarkSync {
    api: Arc<dyn JobsApi>,
    feed: Arc<Mutex<JobFeed>>,
    notifications: Arc<Notifications>,
    tracks: Mutex<HashMap<JobId, Track>>,
}

impl BookmarkSync {
    pub fn new(
        api: Arc<dyn JobsApi>,
        feed: Arc<Mutex<JobFeed>>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            api,
            feed,
            notifications,
            tracks: Mutex::new(HashMap::new()),
        }
    }

    /// Flips the flag and sends save/unsave. Resolves to the flag shown once
    /// this response has been reconciled.
    pub async fn toggle(&self, job_id: &JobId) -> Result<bool, AppError> {
        let pending = self.begin(job_id);
        let sent = if pending.desired {
            self.api.save_job(job_id).await
        } else {
            self.api.unsave_job(job_id).await
        };
        self.finish(&pending, sent)?;
        Ok(self.feed().is_bookmarked(job_id))
    }

    /// Optimistic half: flips the local flag and takes the next sequence
    /// number for the job.
    pub fn begin(&self, job_id: &JobId) -> PendingToggle {
        // Lock order: tracks, then feed.
        let mut tracks = self.tracks();
        let mut feed = self.feed();
        let previous = feed.is_bookmarked(job_id);
        let desired = !previous;
        feed.relations_mut().set_saved(job_id, desired);

        let track = tracks.entry(job_id.clone()).or_default();
        if track.in_flight.is_empty() {
            // Nothing pending, so the shown flag is the backend's (it may
            // have been refreshed since the last toggle).
            track.confirmed = previous;
            track.confirmed_seq = track.latest;
        }
        track.latest += 1;
        let seq = track.latest;
        track.in_flight.insert(seq);

        debug!(%job_id, seq, desired, "bookmark toggle issued");
        PendingToggle {
            job_id: job_id.clone(),
            seq,
            previous,
            desired,
        }
    }

    /// Reconciliation half. A rejected latest toggle falls back to the last
    /// confirmed flag, is notified and handed back as the error.
    pub fn finish(
        &self,
        pending: &PendingToggle,
        result: Result<(), AppError>,
    ) -> Result<ToggleOutcome, AppError> {
        let mut tracks = self.tracks();
        let track = tracks.entry(pending.job_id.clone()).or_default();
        track.in_flight.remove(&pending.seq);
        if result.is_ok() && pending.seq > track.confirmed_seq {
            track.confirmed = pending.desired;
            track.confirmed_seq = pending.seq;
        }
        let confirmed = track.confirmed;

        if pending.seq != track.latest {
            if !track.newer_in_flight(pending.seq) {
                self.feed()
                    .relations_mut()
                    .set_saved(&pending.job_id, confirmed);
            }
            drop(tracks);
            if let Err(e) = result {
                let _ = AppError::Silent(format!(
                    "superseded bookmark toggle {} on {} failed: {e}",
                    pending.seq, pending.job_id
                ))
                .notify(&self.notifications);
            } else {
                debug!(job_id = %pending.job_id, seq = pending.seq, "stale bookmark response reconciled");
            }
            return Ok(ToggleOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                drop(tracks);
                info!(job_id = %pending.job_id, saved = pending.desired, "bookmark confirmed");
                let message = if pending.desired {
                    "Job saved"
                } else {
                    "Job removed from saved"
                };
                self.notifications.push(Notification::success(message));
                Ok(ToggleOutcome::Confirmed)
            }
            Err(e) => {
                self.feed()
                    .relations_mut()
                    .set_saved(&pending.job_id, confirmed);
                drop(tracks);
                Err(e.notify(&self.notifications))
            }
        }
    }

    fn tracks(&self) -> MutexGuard<'_, HashMap<JobId, Track>> {
        self.tracks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn feed(&self) -> MutexGuard<'_, JobFeed> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
