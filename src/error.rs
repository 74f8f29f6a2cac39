use serde::Serialize;
use thiserror::Error;

/// A validation problem at a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new<P, S>(path: P, message: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            path: path.into_iter().map(|s| s.to_string()).collect(),
            message: message.into(),
        }
    }

    pub fn root(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Dotted path such as `opers.0.name`
    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.dotted_path(), self.message)
        }
    }
}

#[derive(Debug, Error)]
pub enum CopilotError {
    /// Input is not valid JSON
    #[error("JSON 语法错误 (第 {line} 行第 {column} 列): {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Valid JSON that is still not an operation after repair
    #[error("作业格式错误: {}", format_issues(.0))]
    Schema(Vec<Issue>),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a non-success body
    #[error("remote error ({status}): {message}")]
    Remote { status: i64, message: String },
}

impl CopilotError {
    pub fn syntax(err: &serde_json::Error) -> Self {
        CopilotError::Syntax {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, CopilotError::Syntax { .. })
    }
}

fn format_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CopilotError>;
