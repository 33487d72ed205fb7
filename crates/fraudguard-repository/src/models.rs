//! Data models for the repository layer

use fraudguard_core::{FraudRuleOverride, FraudRuleType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// Status of a partner in a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
    Invited,
    Declined,
    Banned,
    Archived,
}

/// Partner enrollment row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramEnrollment {
    pub partner_id: String,
    pub program_id: String,
    pub status: EnrollmentStatus,
}

impl ProgramEnrollment {
    pub fn new(
        partner_id: impl Into<String>,
        program_id: impl Into<String>,
        status: EnrollmentStatus,
    ) -> Self {
        Self {
            partner_id: partner_id.into(),
            program_id: program_id.into(),
            status,
        }
    }
}

/// Parse a stored rule type.
///
/// Rows written for a rule type this build does not know are logged and
/// skipped, so one stale row never hides the rest of a program's overrides.
pub(crate) fn known_rule_type(
    program_id: &str,
    override_id: &str,
    raw: &str,
) -> Option<FraudRuleType> {
    match raw.parse() {
        Ok(rule_type) => Some(rule_type),
        Err(_) => {
            tracing::warn!(
                "Skipping override {} for program {}: unknown rule type '{}'",
                override_id,
                program_id,
                raw
            );
            None
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries in cache
    pub size: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A cached value with TTL support
#[derive(Debug, Clone)]
pub(crate) struct CachedArtifact<T> {
    pub data: T,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl<T> CachedArtifact<T> {
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this cached entry has expired
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether caching is enabled
    pub enabled: bool,
    /// Time-to-live for cache entries
    #[serde(with = "duration_secs")]
    pub default_ttl: Duration,
    /// Maximum number of programs to keep in cache
    pub max_entries: Option<usize>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: Duration::from_secs(60),
            max_entries: Some(1000),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable caching
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Set the default TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// Per-program override cache shared by the file-system and database stores
pub(crate) struct OverrideCache {
    entries: RwLock<HashMap<String, CachedArtifact<Vec<FraudRuleOverride>>>>,
    config: CacheConfig,
    stats: Mutex<CacheStats>,
}

impl OverrideCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn get(&self, program_id: &str) -> Option<Vec<FraudRuleOverride>> {
        if !self.config.enabled {
            return None;
        }

        let hit = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            entries
                .get(program_id)
                .filter(|cached| !cached.is_expired())
                .map(|cached| cached.data.clone())
        };

        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        if hit.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        hit
    }

    pub fn put(&self, program_id: &str, overrides: Vec<FraudRuleOverride>) {
        if !self.config.enabled {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(max) = self.config.max_entries {
            if entries.len() >= max && !entries.contains_key(program_id) {
                entries.retain(|_, cached| !cached.is_expired());
                if entries.len() >= max {
                    // Evict the oldest entry
                    let oldest = entries
                        .iter()
                        .min_by_key(|(_, cached)| cached.cached_at)
                        .map(|(key, _)| key.clone());
                    if let Some(key) = oldest {
                        entries.remove(&key);
                    }
                }
            }
        }
        entries.insert(
            program_id.to_string(),
            CachedArtifact::new(overrides, self.config.default_ttl),
        );

        self.stats.lock().unwrap_or_else(|e| e.into_inner()).size = entries.len();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).size = 0;
    }

    pub fn invalidate(&self, program_id: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(program_id);
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).size = entries.len();
    }
}
