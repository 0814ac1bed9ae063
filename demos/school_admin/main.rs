//! School administration example: staff, rooms and exams behind the generic service
//!
//! Run with `RUST_LOG=registrar=debug cargo run --example school_admin` to
//! see the query pipeline logs.

use chrono::TimeZone;
use registrar::entities::{Exam, Room, Staff, Term};
use registrar::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/school_admin/registrar.yaml");

fn staff(first: &str, last: &str, department: &str, status: &str, salary: f64, year: i32) -> Staff {
    Staff::new(
        first.to_string(),
        last.to_string(),
        format!("{}.{}@school.example", first.to_lowercase(), last.to_lowercase()),
        department.to_string(),
        status.to_string(),
        salary,
        Utc.with_ymd_and_hms(year, 9, 1, 0, 0, 0).unwrap(),
        None,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🏫 Registrar School Admin Example\n");

    let config = RegistrarConfig::merge(vec![
        RegistrarConfig::default_config(),
        RegistrarConfig::from_yaml_file(CONFIG_PATH)?,
    ]);
    let pagination = config.pagination();

    let staff_service: EntityService<Staff, _> = EntityService::from_config(
        InMemoryStore::with_records(vec![
            staff("Anna", "Smith", "Science", "Active", 52_000.0, 2015),
            staff("Ben", "Jones", "Maths", "Active", 48_500.0, 2019),
            staff("Carla", "Smithson", "Science", "OnLeave", 61_000.0, 2011),
            staff("Dev", "Patel", "History", "Active", 45_000.0, 2022),
            staff("Eve", "Goldsmith", "Maths", "Retired", 39_000.0, 1998),
        ]),
        &config,
    )?;
    let room_service: EntityService<Room, _> =
        EntityService::from_config(InMemoryStore::new(), &config)?;

    // Active staff whose name contains "smith", newest hire first
    let params: ListParams = serde_json::from_value(json!({
        "PageNumber": 1,
        "PageSize": 10,
        "Filters": [{ "PropertyName": "Status", "Operator": "Equal", "Value": "Active" }],
        "SearchTerm": "smith",
        "SortField": "HiredOn",
        "SortOrder": "desc"
    }))?;
    let page = staff_service.list(&params.into_query(&pagination)?).await?;
    println!("🔎 Active staff matching 'smith': {}", page.meta.total);
    for member in &page.items {
        println!("   - {} {} ({})", member.first_name, member.last_name, member.department);
    }

    // Default ordering from config, second page of two
    let query = ListQuery::new(PageRequest::new(2, 2)?);
    let page = staff_service.list(&query).await?;
    println!(
        "\n📄 Staff page {}/{} by last name:",
        page.meta.page, page.meta.total_pages
    );
    for member in &page.items {
        println!("   - {}", member.last_name);
    }

    // Malformed requests fail with precise errors
    let bad = ListQuery::new(PageRequest::DEFAULT).filter(FilterCriterion::new(
        "salary",
        FilterOperator::Contains,
        "000",
    ));
    if let Err(e) = staff_service.list(&bad).await {
        println!("\n❌ {} ({})", e, e.error_code());
    }
    if let Err(e) = PageRequest::new(1, 0) {
        println!("❌ {} ({})", e, e.error_code());
    }

    // CRUD on rooms
    let lab = room_service
        .create(Room::new("Lab 1".to_string(), "Science".to_string(), 2, 24, true))
        .await?;
    let lab = room_service
        .patch(&lab.id, &[FieldPatch::new("Capacity", 30), FieldPatch::new("name", "Chemistry Lab")])
        .await?;
    println!("\n✅ Patched room: {} (capacity {})", lab.name, lab.capacity);

    if let Err(e) = room_service.patch(&lab.id, &[FieldPatch::new("id", Uuid::new_v4().to_string())]).await {
        println!("❌ {}", e);
    }

    room_service.delete(&lab.id).await?;
    println!("🗑️  Deleted room, remaining: {}", room_service.store().count().await?);

    // Exams carry the terms they belong to
    let autumn = Term::new(
        "Autumn 2026".to_string(),
        Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 12, 18, 0, 0, 0).unwrap(),
        true,
    );
    let term_service: Arc<EntityService<Term, _>> = Arc::new(EntityService::from_config(
        InMemoryStore::with_records(vec![autumn.clone()]),
        &config,
    )?);
    let mut related = RelatedRegistry::new();
    related.register(term_service);

    let exam_service: EntityService<Exam, _> = EntityService::from_config(
        InMemoryStore::with_records(vec![
            Exam::new(
                "Midterm".to_string(),
                "Physics".to_string(),
                Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap(),
                50,
                Some(autumn.id),
            ),
            Exam::new(
                "Final".to_string(),
                "Physics".to_string(),
                Utc.with_ymd_and_hms(2026, 12, 15, 9, 0, 0).unwrap(),
                100,
                Some(autumn.id),
            ),
        ]),
        &config,
    )?
    .with_related(related)?;

    let page = exam_service.list(&ListQuery::new(PageRequest::DEFAULT)).await?;
    println!("\n📝 Exams, latest first:");
    for exam in &page.items {
        println!("   - {} ({})", exam.title, exam.exam_date.date_naive());
    }
    for term in page.included("term_id") {
        println!("   📅 term: {}", term["name"]);
    }

    Ok(())
}
