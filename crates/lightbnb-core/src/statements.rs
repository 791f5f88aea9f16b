//! Fixed statements for users, reservations and property inserts.

use crate::errors::{LightbnbError, Result};
use crate::model::{NewProperty, NewUser, UserId};
use crate::query::{normalize_limit, PlanBuilder, QueryPlan};
use crate::util::dollars_to_cents;

const PROPERTY_COLUMNS: [&str; 14] = [
    "owner_id",
    "title",
    "description",
    "thumbnail_photo_url",
    "cover_photo_url",
    "cost_per_night",
    "parking_spaces",
    "number_of_bathrooms",
    "number_of_bedrooms",
    "country",
    "street",
    "city",
    "province",
    "post_code",
];

/// Emails are matched case-insensitively by lower-casing before binding.
pub fn user_by_email(email: &str) -> QueryPlan {
    let mut plan = PlanBuilder::new(&["SELECT *", "FROM users"]);
    let n = plan.bind(email.to_lowercase());
    plan.clause(format!("WHERE email = ${}", n));
    plan.finish()
}

pub fn user_by_id(id: UserId) -> QueryPlan {
    let mut plan = PlanBuilder::new(&["SELECT *", "FROM users"]);
    let n = plan.bind(id);
    plan.clause(format!("WHERE id = ${}", n));
    plan.finish()
}

pub fn insert_user(user: &NewUser) -> QueryPlan {
    let mut plan = PlanBuilder::new(&["INSERT INTO users (name, email, password)"]);
    let slots = [
        plan.bind(user.name.as_str()),
        plan.bind(user.email.as_str()),
        plan.bind(user.password.as_str()),
    ];
    plan.clause(values_clause(&slots));
    plan.clause("RETURNING *");
    plan.finish()
}

/// A guest's reservations with the reserved property's title, nightly cost
/// and average rating, earliest first.
pub fn reservations_for_guest(guest_id: UserId, limit: Option<i64>) -> QueryPlan {
    let mut plan = PlanBuilder::new(&[
        "SELECT reservations.id, properties.title, properties.cost_per_night, reservations.start_date, avg(property_reviews.rating) AS average_rating",
        "FROM reservations",
        "JOIN properties ON reservations.property_id = properties.id",
        "JOIN property_reviews ON properties.id = property_reviews.property_id",
    ]);
    let guest = plan.bind(guest_id);
    plan.clause(format!("WHERE reservations.guest_id = ${}", guest));
    plan.clause("GROUP BY properties.id, reservations.id");
    plan.clause("ORDER BY reservations.start_date");
    let n = plan.bind(normalize_limit(limit));
    plan.clause(format!("LIMIT ${}", n));
    plan.finish()
}

/// Fails when the nightly cost is not a finite amount that fits in cents.
pub fn insert_property(property: &NewProperty) -> Result<QueryPlan> {
    let cost = dollars_to_cents(property.cost_per_night).ok_or_else(|| {
        LightbnbError::Invalid(format!(
            "cost_per_night {} is not a valid price",
            property.cost_per_night
        ))
    })?;
    let mut plan = PlanBuilder::new(&[]);
    plan.clause(format!(
        "INSERT INTO properties ({})",
        PROPERTY_COLUMNS.join(", ")
    ));
    let slots = [
        plan.bind(property.owner_id),
        plan.bind(property.title.as_str()),
        plan.bind(property.description.as_str()),
        plan.bind(property.thumbnail_photo_url.as_str()),
        plan.bind(property.cover_photo_url.as_str()),
        plan.bind(cost),
        plan.bind(property.parking_spaces),
        plan.bind(property.number_of_bathrooms),
        plan.bind(property.number_of_bedrooms),
        plan.bind(property.country.as_str()),
        plan.bind(property.street.as_str()),
        plan.bind(property.city.as_str()),
        plan.bind(property.province.as_str()),
        plan.bind(property.post_code.as_str()),
    ];
    plan.clause(values_clause(&slots));
    plan.clause("RETURNING *");
    Ok(plan.finish())
}

fn values_clause(slots: &[usize]) -> String {
    let placeholders: Vec<String> = slots.iter().map(|n| format!("${}", n)).collect();
    format!("VALUES ({})", placeholders.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{placeholders, SqlValue};

    fn assert_contiguous(plan: &QueryPlan) {
        let expected: Vec<usize> = (1..=plan.params().len()).collect();
        assert_eq!(placeholders(plan.template()), expected);
    }

    #[test]
    fn email_lookup_lowercases_before_binding() {
        let plan = user_by_email("Alice@Example.COM");
        assert!(plan.template().contains("WHERE email = $1"));
        assert_eq!(plan.params(), &[SqlValue::Text("alice@example.com".into())]);
        assert_contiguous(&plan);
    }

    #[test]
    fn user_insert_binds_three_values() {
        let plan = insert_user(&NewUser {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "hash".into(),
        });
        assert!(plan.template().contains("VALUES ($1, $2, $3)"));
        assert!(plan.template().contains("RETURNING *"));
        assert_eq!(plan.params().len(), 3);
        assert_contiguous(&plan);
    }

    #[test]
    fn reservations_bind_guest_then_limit() {
        let plan = reservations_for_guest(42, Some(-1));
        assert_eq!(plan.params(), &[SqlValue::Int(42), SqlValue::Int(10)]);
        assert!(plan.template().contains("reservations.guest_id = $1"));
        assert!(plan.template().contains("LIMIT $2"));
        assert_contiguous(&plan);
    }

    #[test]
    fn property_insert_converts_cost_to_cents() {
        let plan = insert_property(&NewProperty {
            owner_id: 1,
            title: "Cozy loft".into(),
            cost_per_night: 85.5,
            city: "Vancouver".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(plan.params().len(), PROPERTY_COLUMNS.len());
        assert_eq!(plan.params()[5], SqlValue::Int(8550));
        assert_eq!(plan.params()[11], SqlValue::Text("Vancouver".into()));
        assert_contiguous(&plan);
    }

    #[test]
    fn property_insert_rejects_unrepresentable_cost() {
        for cost in [f64::NAN, f64::INFINITY, 1e20] {
            let err = insert_property(&NewProperty {
                owner_id: 1,
                title: "Loft".into(),
                cost_per_night: cost,
                city: "Vancouver".into(),
                ..Default::default()
            })
            .unwrap_err();
            assert!(matches!(err, LightbnbError::Invalid(_)));
        }
    }
}
