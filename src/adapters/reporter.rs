use crate::domain::model::{ErrorReport, ReportSeverity};
use crate::domain::ports::ErrorReporter;
use std::sync::Mutex;

/// Sends reports to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, report: ErrorReport) {
        match report.severity {
            ReportSeverity::Transaction => {
                tracing::error!(code = %report.code, "{}", report.message)
            }
            ReportSeverity::Addon => tracing::warn!(code = %report.code, "{}", report.message),
        }
    }
}

/// Keeps reports in memory for later inspection.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<ErrorReport>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, report: ErrorReport) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report);
        }
    }
}
