//! Prometheus metrics for the evaluation loop.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub cycles_total: Counter,
    pub alerts_total: Counter,
    pub fixes_dropped_total: Counter,
    pub cycle_duration: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    /// Builds a private registry with the monitor's instruments.
    ///
    /// # Panics
    /// Only on duplicate registration, which cannot happen with a fresh
    /// registry.
    pub fn new() -> Self {
        let registry = Registry::new();
        let cycles_total =
            Counter::new("havvakt_cycles_total", "Completed evaluation cycles").unwrap();
        let alerts_total =
            Counter::new("havvakt_alerts_total", "Geofence breach alerts raised").unwrap();
        let fixes_dropped_total = Counter::new(
            "havvakt_fixes_dropped_total",
            "Position fixes dropped by validation",
        )
        .unwrap();
        let cycle_duration = Histogram::with_opts(
            HistogramOpts::new(
                "havvakt_cycle_duration_seconds",
                "Wall time of one evaluation cycle",
            )
            .buckets(vec![0.001, 0.01, 0.1, 1.0, 10.0]),
        )
        .unwrap();

        registry.register(Box::new(cycles_total.clone())).unwrap();
        registry.register(Box::new(alerts_total.clone())).unwrap();
        registry
            .register(Box::new(fixes_dropped_total.clone()))
            .unwrap();
        registry.register(Box::new(cycle_duration.clone())).unwrap();

        Self {
            registry,
            cycles_total,
            alerts_total,
            fixes_dropped_total,
            cycle_duration,
        }
    }

    /// Records the outcome of one finished cycle.
    pub fn observe_cycle(&self, duration_secs: f64, alerts: usize, dropped: usize) {
        self.cycles_total.inc();
        self.alerts_total.inc_by(alerts as f64);
        self.fixes_dropped_total.inc_by(dropped as f64);
        self.cycle_duration.observe(duration_secs);
    }

    /// Text-format export for a scrape endpoint or a dump on shutdown.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_cycle_updates_counters() {
        let metrics = MetricsRecorder::new();
        metrics.observe_cycle(0.05, 2, 1);
        metrics.observe_cycle(0.02, 0, 0);
        assert_eq!(metrics.cycles_total.get(), 2.0);
        assert_eq!(metrics.alerts_total.get(), 2.0);
        assert_eq!(metrics.fixes_dropped_total.get(), 1.0);
    }

    #[test]
    fn gather_metrics_exports_names() {
        let metrics = MetricsRecorder::new();
        metrics.observe_cycle(0.01, 1, 0);
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("havvakt_cycles_total"));
        assert!(text.contains("havvakt_alerts_total"));
    }
}
