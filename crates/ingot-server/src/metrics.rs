// Metrics module for observability
// Installs the Prometheus recorder and registers descriptions for the counters
// and gauges emitted by the library crates

use std::path::Path;

use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and describe every metric.
/// Should be called once at application startup.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|_| anyhow::anyhow!("a metrics recorder is already installed"))?;

    describe_metrics();

    tracing::info!("Metrics initialized");
    Ok(handle)
}

/// Write the current values in Prometheus text format, for node exporter's
/// textfile collector or a one-off inspection after a run
pub async fn export_metrics(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    tokio::fs::write(path, handle.render()).await
}

fn describe_metrics() {
    // Lock metrics
    describe_counter!(
        "ingot_lock_acquisitions_total",
        "Total number of successful lock acquisitions"
    );
    describe_counter!(
        "ingot_lock_contentions_total",
        "Total number of acquisitions rejected because the key was held"
    );
    describe_counter!(
        "ingot_lock_releases_total",
        "Total number of locks released by their owner"
    );
    describe_counter!(
        "ingot_lock_release_races_total",
        "Total number of releases skipped because the lock had expired or changed hands"
    );
    describe_gauge!(
        "ingot_lock_entries_alive",
        "Current number of live lock entries in the memory backend"
    );

    // Ingestion metrics
    describe_counter!("ingot_items_saved_total", "Total number of items saved");
    describe_counter!(
        "ingot_items_duplicate_total",
        "Total number of submissions rejected as duplicate content"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded() -> PrometheusHandle {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || {
            describe_metrics();
            ::metrics::counter!("ingot_items_saved_total").increment(2);
            ::metrics::gauge!("ingot_lock_entries_alive").set(3.0);
        });
        handle
    }

    #[test]
    fn test_render_described_metrics() {
        let text = recorded().render();

        assert!(text.contains("# HELP ingot_items_saved_total Total number of items saved"));
        assert!(text.contains("ingot_items_saved_total 2"));
        assert!(text.contains("ingot_lock_entries_alive 3"));
    }

    #[tokio::test]
    async fn test_export_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ingot.prom");

        export_metrics(&recorded(), &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("ingot_items_saved_total 2"));
    }
}
