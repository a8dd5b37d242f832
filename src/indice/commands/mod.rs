use crate::config::IndiceConfig;
use crate::reconcile::RebuildReport;

pub mod all;
pub mod build;
pub mod config;
pub mod outline;
pub mod refresh;
pub mod watch;

#[derive(Debug, Clone)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Vault paths of documents the command wrote.
    pub affected_documents: Vec<String>,
    pub outline: Option<String>,
    pub config: Option<IndiceConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_documents(mut self, paths: Vec<String>) -> Self {
        self.affected_documents = paths;
        self
    }

    pub fn with_outline(mut self, outline: String) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn with_config(mut self, config: IndiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| matches!(m.level, MessageLevel::Error))
    }
}

/// Collects a rebuild report: rewritten documents become the affected
/// documents, failures become error messages.
pub(crate) fn report_result(report: RebuildReport) -> CmdResult {
    let mut result = CmdResult::default();
    for failure in &report.failed {
        result.add_message(CmdMessage::error(format!(
            "Failed to update {}: {}",
            failure.path, failure.error
        )));
    }
    result.with_affected_documents(report.rewritten)
}
