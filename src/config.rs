// Engine configuration
//
// Collected from environment variables at startup (dotenv loads .env first).
// Every knob has a default matching the reference deployment so a bare
// environment still runs.

use std::str::FromStr;

use crate::venues::VenueKind;

/// Hold time-to-live per venue kind, in minutes
#[derive(Debug, Clone)]
pub struct HoldTtls {
    pub room_minutes: i64,
    pub hall_minutes: i64,
    pub lawn_minutes: i64,
    pub photoshoot_minutes: i64,
}

impl Default for HoldTtls {
    fn default() -> Self {
        Self {
            room_minutes: 3,
            hall_minutes: 3,
            lawn_minutes: 3,
            photoshoot_minutes: 3,
        }
    }
}

impl HoldTtls {
    /// TTL minutes for holds on venues of this kind
    pub fn minutes_for(&self, kind: VenueKind) -> i64 {
        match kind {
            VenueKind::Room => self.room_minutes,
            VenueKind::Hall => self.hall_minutes,
            VenueKind::Lawn => self.lawn_minutes,
            VenueKind::Photoshoot => self.photoshoot_minutes,
        }
    }
}

/// Reconciliation scheduler tuning
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between sweep cycles
    pub sweep_interval_secs: u64,
    /// Maintenance windows ended more than this many days ago are purged
    pub retention_days: i32,
    /// Per-pass retry ceiling on serialization/deadlock failures
    pub max_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 10,
            retention_days: 30,
            max_attempts: 5,
        }
    }
}

/// All engine configuration, read once at startup
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub hold_ttls: HoldTtls,
    pub scheduler: SchedulerConfig,
    /// Whether photoshoot sessions may coexist on the same date and time
    pub allow_overlapping_photoshoots: bool,
}

impl EngineConfig {
    /// Build configuration from environment variables, falling back to
    /// reference defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = HoldTtls::default();
        let default_sched = SchedulerConfig::default();

        Self {
            hold_ttls: HoldTtls {
                room_minutes: env_or("HOLD_TTL_ROOM_MINUTES", defaults.room_minutes),
                hall_minutes: env_or("HOLD_TTL_HALL_MINUTES", defaults.hall_minutes),
                lawn_minutes: env_or("HOLD_TTL_LAWN_MINUTES", defaults.lawn_minutes),
                photoshoot_minutes: env_or("HOLD_TTL_PHOTOSHOOT_MINUTES", defaults.photoshoot_minutes),
            },
            scheduler: SchedulerConfig {
                sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", default_sched.sweep_interval_secs),
                retention_days: env_or("MAINTENANCE_RETENTION_DAYS", default_sched.retention_days),
                max_attempts: env_or("SWEEP_MAX_ATTEMPTS", default_sched.max_attempts),
            },
            allow_overlapping_photoshoots: env_or("ALLOW_OVERLAPPING_PHOTOSHOOTS", true),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_ttls: HoldTtls::default(),
            scheduler: SchedulerConfig::default(),
            allow_overlapping_photoshoots: true,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = EngineConfig::default();
        assert_eq!(config.hold_ttls.room_minutes, 3);
        assert_eq!(config.scheduler.sweep_interval_secs, 10);
        assert_eq!(config.scheduler.retention_days, 30);
        assert_eq!(config.scheduler.max_attempts, 5);
        assert!(config.allow_overlapping_photoshoots);
    }

    #[test]
    fn env_override_parses_and_bad_values_fall_back() {
        std::env::set_var("HOLD_TTL_LAWN_MINUTES_TEST", "7");
        assert_eq!(env_or("HOLD_TTL_LAWN_MINUTES_TEST", 3i64), 7);

        std::env::set_var("HOLD_TTL_LAWN_MINUTES_TEST", "not-a-number");
        assert_eq!(env_or("HOLD_TTL_LAWN_MINUTES_TEST", 3i64), 3);

        std::env::remove_var("HOLD_TTL_LAWN_MINUTES_TEST");
        assert_eq!(env_or("HOLD_TTL_LAWN_MINUTES_TEST", 3i64), 3);
    }
}
