use crate::traits::{Executor, Row};
use lightbnb_core::statements;
use lightbnb_core::{
    build_listing_query, FilterCriteria, LightbnbError, NewProperty, NewUser, Property,
    PropertyListing, QueryPlan, ReservationSummary, Result, User, UserId,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};

/// Data access for users, reservations and properties over an injected
/// execution client.
#[derive(Clone)]
pub struct Database {
    exec: Arc<dyn Executor>,
}

impl Database {
    pub fn new(exec: Arc<dyn Executor>) -> Self {
        Self { exec }
    }

    async fn run(&self, op: &'static str, plan: QueryPlan) -> Result<Vec<Row>> {
        debug!(op, template = plan.template(), params = ?plan.params(), "executing");
        self.exec.execute_plan(&plan).await.map_err(|e| {
            error!(op, "query failed: {}", e);
            e
        })
    }

    pub async fn get_user_with_email(&self, email: &str) -> Result<Option<User>> {
        let rows = self
            .run("get_user_with_email", statements::user_by_email(email))
            .await?;
        first_row(rows)
    }

    pub async fn get_user_with_id(&self, id: UserId) -> Result<Option<User>> {
        let rows = self
            .run("get_user_with_id", statements::user_by_id(id))
            .await?;
        first_row(rows)
    }

    pub async fn add_user(&self, user: NewUser) -> Result<User> {
        let rows = self.run("add_user", statements::insert_user(&user)).await?;
        first_row(rows)?.ok_or_else(|| LightbnbError::Internal("insert returned no row".into()))
    }

    pub async fn get_all_reservations(
        &self,
        guest_id: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<ReservationSummary>> {
        let rows = self
            .run(
                "get_all_reservations",
                statements::reservations_for_guest(guest_id, limit),
            )
            .await?;
        decode_rows(rows)
    }

    pub async fn get_all_properties(
        &self,
        criteria: &FilterCriteria,
        limit: Option<i64>,
    ) -> Result<Vec<PropertyListing>> {
        let rows = self
            .run("get_all_properties", build_listing_query(criteria, limit))
            .await?;
        decode_rows(rows)
    }

    pub async fn add_property(&self, property: NewProperty) -> Result<Property> {
        if property.title.trim().is_empty() {
            return Err(LightbnbError::Invalid("property title is required".into()));
        }
        let rows = self
            .run("add_property", statements::insert_property(&property)?)
            .await?;
        first_row(rows)?.ok_or_else(|| LightbnbError::Internal("insert returned no row".into()))
    }
}

fn first_row<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Option<T>> {
    match rows.into_iter().next() {
        Some(row) => Ok(Some(serde_json::from_value(row)?)),
        None => Ok(None),
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|r| serde_json::from_value(r).map_err(LightbnbError::from))
        .collect()
}
