//! School administration entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

crate::impl_queryable_entity!(
    School,
    "school",
    ["name", "city", "address"],
    {
        name: String,
        address: String,
        city: String,
        phone: Option<String>,
        established: i32,
    }
);

crate::impl_queryable_entity!(
    Tenant,
    "tenant",
    ["name", "domain"],
    {
        name: String,
        domain: String,
        active: bool,
        max_users: i32,
    }
);

crate::impl_queryable_entity!(
    Staff,
    "staff",
    ["first_name", "last_name", "email"],
    {
        first_name: String,
        last_name: String,
        email: String,
        department: String,
        status: String,
        salary: f64,
        hired_on: DateTime<Utc>,
        school_id: Option<Uuid>,
    }
);

crate::impl_queryable_entity!(
    Term,
    "term",
    ["name"],
    {
        name: String,
        starts_on: DateTime<Utc>,
        ends_on: DateTime<Utc>,
        is_current: bool,
    }
);

crate::impl_queryable_entity!(
    Grade,
    "grade",
    ["name", "description"],
    {
        name: String,
        level: i32,
        description: Option<String>,
    }
);

crate::impl_queryable_entity!(
    Exam,
    "exam",
    ["title", "subject"],
    {
        title: String,
        subject: String,
        exam_date: DateTime<Utc>,
        max_score: i32,
        term_id: Option<Uuid>,
    }
);

crate::impl_queryable_entity!(
    Fee,
    "fee",
    ["name", "student_name"],
    {
        name: String,
        student_name: String,
        amount: f64,
        due_date: DateTime<Utc>,
        paid: bool,
    }
);

crate::impl_queryable_entity!(
    Leave,
    "leave",
    ["reason", "status"],
    {
        staff_id: Uuid,
        reason: String,
        status: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        approved: bool,
    }
);

crate::impl_queryable_entity!(
    Room,
    "room",
    ["name", "building"],
    {
        name: String,
        building: String,
        floor: i32,
        capacity: i32,
        has_projector: bool,
    }
);

crate::impl_queryable_entity!(
    Event,
    "event",
    ["title", "description", "location"],
    {
        title: String,
        description: Option<String>,
        location: String,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Queryable;
    use crate::core::field::FieldKind;

    #[test]
    fn test_every_schema_builds() {
        assert_eq!(School::entity_type(), "school");
        assert_eq!(Tenant::entity_type(), "tenant");
        assert_eq!(Staff::entity_type(), "staff");
        assert_eq!(Term::entity_type(), "term");
        assert_eq!(Grade::entity_type(), "grade");
        assert_eq!(Exam::entity_type(), "exam");
        assert_eq!(Fee::entity_type(), "fee");
        assert_eq!(Leave::entity_type(), "leave");
        assert_eq!(Room::entity_type(), "room");
        assert_eq!(Event::entity_type(), "event");
    }

    #[test]
    fn test_staff_schema() {
        let schema = Staff::schema();
        assert_eq!(schema.field("FirstName").unwrap().name(), "first_name");
        assert_eq!(schema.field("HiredOn").unwrap().kind(), FieldKind::DateTime);
        assert_eq!(schema.field("school_id").unwrap().kind(), FieldKind::Uuid);
        assert!(schema.field("school_id").unwrap().is_nullable());
        assert_eq!(
            schema.searchable_fields().map(|f| f.name()).collect::<Vec<_>>(),
            vec!["first_name", "last_name", "email"]
        );
    }
}
