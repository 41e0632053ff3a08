// Reconciliation scheduler
//
// Recurring background task that expires stale holds, derives venue status
// from maintenance-window membership, recomputes the rooms' reserved flag
// and purges old maintenance records. Passes are independent, idempotent
// and individually retried, so one failing pass never blocks the others and
// a skipped cycle is repaired by the next one.

pub mod passes;

use sqlx::PgPool;
use std::future::Future;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::config::SchedulerConfig;
use crate::db;
use crate::venues::VenueKind;

/// The recurring reconciliation task
#[derive(Clone)]
pub struct Scheduler {
    pool: PgPool,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new Scheduler
    pub fn new(pool: PgPool, config: SchedulerConfig) -> Self {
        Self { pool, config }
    }

    /// Spawn the sweep loop on the runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(self.config.sweep_interval_secs));
            // A stalled database must not queue up a burst of catch-up sweeps.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                "Reconciliation scheduler running every {}s",
                self.config.sweep_interval_secs
            );

            loop {
                ticker.tick().await;
                self.run_cycle().await;
            }
        })
    }

    /// Run every pass once
    ///
    /// Public so operational tooling and tests can trigger a sweep directly
    /// instead of waiting on the timer.
    pub async fn run_cycle(&self) {
        self.run_pass("expire_holds", || passes::expire_holds(&self.pool))
            .await;

        for kind in [
            VenueKind::Room,
            VenueKind::Hall,
            VenueKind::Lawn,
            VenueKind::Photoshoot,
        ] {
            self.run_pass("derive_statuses", || {
                let pool = self.pool.clone();
                async move {
                    let (taken_out, restored) = passes::derive_statuses(&pool, kind).await?;
                    Ok(taken_out + restored)
                }
            })
            .await;
        }

        self.run_pass("refresh_reserved_flags", || {
            passes::refresh_reserved_flags(&self.pool)
        })
        .await;

        self.run_pass("purge_expired_windows", || {
            passes::purge_expired_windows(&self.pool, self.config.retention_days)
        })
        .await;
    }

    /// Run one pass under the retry policy, logging instead of propagating
    ///
    /// A pass that exhausts its retries is logged and dropped; the next
    /// scheduled cycle retries it naturally.
    async fn run_pass<F, Fut>(&self, name: &str, op: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<u64, sqlx::Error>>,
    {
        match db::with_retries(name, self.config.max_attempts, op).await {
            Ok(0) => {}
            Ok(affected) => {
                tracing::debug!("Scheduler pass {} touched {} rows", name, affected);
            }
            Err(err) => {
                tracing::error!(
                    "Scheduler pass {} failed after {} attempts: {}",
                    name,
                    self.config.max_attempts,
                    err
                );
            }
        }
    }
}
