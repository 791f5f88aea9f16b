use lightbnb_core::{QueryPlan, Result, SqlValue};

/// One result row, as a JSON object keyed by column name.
pub type Row = serde_json::Value;

/// The execution client: runs a parameterized statement and returns its rows.
#[async_trait::async_trait]
pub trait Executor: Send + Sync + 'static {
    async fn execute(&self, template: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    async fn execute_plan(&self, plan: &QueryPlan) -> Result<Vec<Row>> {
        self.execute(plan.template(), plan.params()).await
    }
}
