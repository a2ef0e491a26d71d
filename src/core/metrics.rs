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

    metrics::describe_counter!("grading_jobs_total", "Grading passes by outcome");
    metrics::describe_counter!(
        "capability_failures_total",
        "External capability failures by capability and applied policy"
    );
    metrics::describe_histogram!("grading_duration_seconds", "Wall time of one grading pass");
    metrics::describe_histogram!("grading_problem_percentage", "Composed percentage per problem");
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}
