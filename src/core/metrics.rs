use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// One backend read issued while enriching a batch.
pub(crate) fn record_lookup(entity: &'static str) {
    metrics::counter!("exam_lookups_total", "entity" => entity).increment(1);
}

pub(crate) fn record_enrich_failure(entity: &'static str) {
    metrics::counter!("exam_enrich_failures_total", "entity" => entity).increment(1);
}

pub(crate) fn record_enriched_rows(rows: usize) {
    metrics::histogram!("exam_enriched_rows").record(rows as f64);
}

pub(crate) fn record_export() {
    metrics::counter!("exam_exports_total").increment(1);
}
