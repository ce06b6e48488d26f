use crate::domain::model::ServiceRecord;
use crate::domain::ports::DiagnosticSink;
use crate::utils::error::{InetdError, SkipReason};
use std::sync::Mutex;

/// 將診斷寫到 tracing；略過的服務以 notice 等級記錄
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn skipped(&self, record: &ServiceRecord, reason: &SkipReason) {
        tracing::info!(
            severity = "notice",
            service = %record.name,
            port = record.port,
            reason = %reason,
            "Skipping service {}/{}: {}",
            record.name,
            record.port,
            reason
        );
    }

    fn fatal(&self, record: &ServiceRecord, error: &InetdError) {
        tracing::error!(
            service = %record.name,
            port = record.port,
            "Aborting provisioning at {}/{}: {}",
            record.name,
            record.port,
            error
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Skipped {
        name: String,
        port: u16,
        reason: SkipReason,
    },
    Fatal {
        name: String,
        port: u16,
        message: String,
    },
}

/// 依序收集診斷，供測試檢查
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn skip_reasons(&self) -> Vec<SkipReason> {
        self.entries()
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::Skipped { reason, .. } => Some(reason),
                Diagnostic::Fatal { .. } => None,
            })
            .collect()
    }

    fn push(&self, diagnostic: Diagnostic) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }
}

impl DiagnosticSink for RecordingSink {
    fn skipped(&self, record: &ServiceRecord, reason: &SkipReason) {
        self.push(Diagnostic::Skipped {
            name: record.name.clone(),
            port: record.port,
            reason: reason.clone(),
        });
    }

    fn fatal(&self, record: &ServiceRecord, error: &InetdError) {
        self.push(Diagnostic::Fatal {
            name: record.name.clone(),
            port: record.port,
            message: error.to_string(),
        });
    }
}
