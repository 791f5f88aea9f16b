use crate::traits::{Executor, Row};
use lightbnb_core::{LightbnbError, Result, SqlValue};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A statement as it reached the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub template: String,
    pub params: Vec<SqlValue>,
}

enum Reply {
    Rows(Vec<Row>),
    Reject(String),
}

/// Executor that records every statement and answers from a script of
/// canned replies, oldest first. With an empty script every statement
/// returns no rows.
#[derive(Clone, Default)]
pub struct InMemoryExecutor {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    replies: VecDeque<Reply>,
    log: Vec<Executed>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.inner.lock().replies.push_back(Reply::Rows(rows));
        self
    }

    pub fn push_rejection(&self, message: impl Into<String>) -> &Self {
        self.inner
            .lock()
            .replies
            .push_back(Reply::Reject(message.into()));
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.inner.lock().log.clone()
    }

    pub fn last_executed(&self) -> Option<Executed> {
        self.inner.lock().log.last().cloned()
    }
}

#[async_trait::async_trait]
impl Executor for InMemoryExecutor {
    async fn execute(&self, template: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let mut inner = self.inner.lock();
        inner.log.push(Executed {
            template: template.to_string(),
            params: params.to_vec(),
        });
        match inner.replies.pop_front() {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Reject(msg)) => Err(LightbnbError::Rejected(msg)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replays_script_in_order_then_empty() {
        let exec = InMemoryExecutor::new();
        exec.push_rows(vec![json!({"id": 1})])
            .push_rejection("syntax error");

        let rows = exec.execute("SELECT 1;", &[]).await.unwrap();
        assert_eq!(rows, vec![json!({"id": 1})]);
        let err = exec
            .execute("SELECT 2;", &[SqlValue::Int(2)])
            .await
            .unwrap_err();
        assert!(matches!(err, LightbnbError::Rejected(m) if m == "syntax error"));
        assert!(exec.execute("SELECT 3;", &[]).await.unwrap().is_empty());

        let log = exec.executed();
        assert_eq!(log.len(), 3);
        assert_eq!(log[1].params, vec![SqlValue::Int(2)]);
        assert_eq!(exec.last_executed().unwrap().template, "SELECT 3;");
    }
}
