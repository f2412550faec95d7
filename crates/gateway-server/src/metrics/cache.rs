//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!("gateway_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("gateway_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "gateway_cache_load_failures_total",
        "Total number of failed load-through calls"
    );
    metrics::describe_counter!(
        "gateway_whitelist_degraded_total",
        "Whitelist writes whose post-write reload failed and were patched in memory"
    );
    metrics::describe_gauge!("gateway_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "gateway_cache_load_seconds",
        "Time spent in load-through calls to the store"
    );
}

/// Recorder de metricas de una instancia de cache.
/// Usa atomic counters internos para que los tests puedan leerlos.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    cache: &'static str,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    loads: Arc<AtomicU64>,
    load_failures: Arc<AtomicU64>,
    degraded: Arc<AtomicU64>,
}

impl CacheMetrics {
    /// Crea un recorder etiquetado con el nombre del cache.
    pub fn new(cache: &'static str) -> Self {
        Self {
            cache,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            loads: Arc::new(AtomicU64::new(0)),
            load_failures: Arc::new(AtomicU64::new(0)),
            degraded: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("gateway_cache_hits_total", "cache" => self.cache).increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("gateway_cache_misses_total", "cache" => self.cache).increment(1);
    }

    /// Registra una carga exitosa desde el store
    pub fn record_load(&self, duration: Duration) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        histogram!("gateway_cache_load_seconds", "cache" => self.cache)
            .record(duration.as_secs_f64());
    }

    /// Registra una carga fallida (el error no se cachea)
    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
        counter!("gateway_cache_load_failures_total", "cache" => self.cache).increment(1);
    }

    /// Registra una escritura de whitelist que quedo parcheada en memoria
    pub fn record_degraded(&self, operation: &'static str) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
        counter!("gateway_whitelist_degraded_total", "operation" => operation).increment(1);
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        gauge!("gateway_cache_entries", "cache" => self.cache).set(count as f64);
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let misses = self.misses() as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn loads(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    pub fn load_failures(&self) -> u64 {
        self.load_failures.load(Ordering::Relaxed)
    }

    pub fn degraded(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }
}
