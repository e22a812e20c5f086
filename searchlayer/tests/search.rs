//! End-to-end search tests: derived model → compiled query → memory backend.

use bson::{DateTime, Uuid};
use serde::{Deserialize, Serialize};

use searchlayer::{memory::InMemoryStore, prelude::*};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Employee {
    id: Uuid,
    name: String,
    email: String,
    level: i64,
    status: String,
    joined_at: DateTime,
}

impl Document for Employee {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "employees"
    }
}

#[derive(Default, Searchable)]
struct EmployeeFilter {
    request: SearchRequest,
    #[search(matches = "prefix")]
    name: Option<String>,
    #[search(keyword = "contain")]
    email: Option<String>,
    #[search(column = "status")]
    statuses: Vec<String>,
    level: Option<NumberRange>,
    #[search(column = "joined_at")]
    joined: Option<DateRange>,
}

fn employee(name: &str, level: i64, status: &str, joined_millis: i64) -> Employee {
    Employee {
        id: Uuid::new(),
        name: name.to_string(),
        email: format!("{}@corp.io", name.to_lowercase()),
        level,
        status: status.to_string(),
        joined_at: DateTime::from_millis(joined_millis),
    }
}

async fn seeded_searcher() -> Searcher<InMemoryStore, EmployeeFilter, Employee> {
    let store = InMemoryStore::new();
    let employees = vec![
        employee("Ada", 9, "active", 1_000),
        employee("Alan", 7, "active", 2_000),
        employee("Grace", 8, "onleave", 3_000),
        employee("Edsger", 6, "terminated", 4_000),
        employee("Linus", 5, "active", 5_000),
        employee("Barbara", 10, "active", 6_000),
        employee("Donald", 4, "onleave", 7_000),
    ];
    store
        .insert_documents(
            employees
                .iter()
                .map(|employee| (*employee.id(), employee.to_bson().unwrap()))
                .collect(),
            Employee::collection_name(),
        )
        .await;

    Searcher::builder(store).build()
}

fn filter(request: SearchRequest) -> EmployeeFilter {
    EmployeeFilter {
        request,
        ..EmployeeFilter::default()
    }
}

#[tokio::test]
async fn unfiltered_search_pages_and_counts() {
    let searcher = seeded_searcher().await;
    let request = SearchRequest::new(1, 3).with_sort("name");
    let outcome = searcher.search(&filter(request.clone())).await.unwrap();

    assert_eq!(outcome.total, 7);
    let names: Vec<&str> = outcome
        .items
        .iter()
        .map(|employee| employee.name.as_str())
        .collect();
    assert_eq!(names, ["Ada", "Alan", "Barbara"]);

    let page = outcome.into_page(&request);
    assert_eq!(page.next_page, Some(2));
    assert_eq!(page.previous_page, None);
}

#[tokio::test]
async fn first_page_override_walks_every_record_once() {
    let searcher = seeded_searcher().await;

    let mut levels = Vec::new();
    for page in 1..=3 {
        let request = SearchRequest::new(page, 3)
            .with_first_limit(2)
            .with_sort("level");
        let outcome = searcher.search(&filter(request)).await.unwrap();
        levels.extend(outcome.items.iter().map(|employee| employee.level));
    }

    assert_eq!(levels, [4, 5, 6, 7, 8, 9, 10]);
}

#[tokio::test]
async fn prefix_filter_matches_from_the_start() {
    let searcher = seeded_searcher().await;
    let mut model = filter(SearchRequest::new(1, 10));
    model.name = Some("Al".to_string());

    let outcome = searcher.search(&model).await.unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.items[0].name, "Alan");
}

#[tokio::test]
async fn keyword_scans_only_opted_in_fields() {
    let searcher = seeded_searcher().await;
    let model = filter(SearchRequest::new(1, 10).with_keyword("ada"));

    let outcome = searcher.search(&model).await.unwrap();
    // Only the email field declares a keyword mode; "ada" matches ada@corp.io.
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.items[0].name, "Ada");
}

#[tokio::test]
async fn explicit_email_wins_over_keyword() {
    let searcher = seeded_searcher().await;
    let mut model = filter(SearchRequest::new(1, 10).with_keyword("ada"));
    model.email = Some("grace".to_string());

    let outcome = searcher.search(&model).await.unwrap();
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.items[0].name, "Grace");
}

#[tokio::test]
async fn status_list_compiles_to_inclusion_set() {
    let searcher = seeded_searcher().await;
    let mut model = filter(SearchRequest::new(1, 10).with_sort("name"));
    model.statuses = vec!["onleave".to_string(), "terminated".to_string()];

    let outcome = searcher.search(&model).await.unwrap();
    let names: Vec<&str> = outcome
        .items
        .iter()
        .map(|employee| employee.name.as_str())
        .collect();
    assert_eq!(names, ["Donald", "Edsger", "Grace"]);
}

#[tokio::test]
async fn level_range_applies_inclusive_bounds() {
    let searcher = seeded_searcher().await;
    let mut model = filter(SearchRequest::new(1, 10).with_sort("level"));
    model.level = Some(NumberRange {
        min: Some(7.0),
        max: Some(9.0),
        ..NumberRange::default()
    });

    let outcome = searcher.search(&model).await.unwrap();
    let levels: Vec<i64> = outcome.items.iter().map(|employee| employee.level).collect();
    assert_eq!(levels, [7, 8, 9]);
}

#[tokio::test]
async fn open_ended_date_range_applies_one_bound() {
    let searcher = seeded_searcher().await;
    let mut model = filter(SearchRequest::new(1, 10));
    model.joined = Some(DateRange {
        start: Some(DateTime::from_millis(5_000)),
        end: None,
    });

    let outcome = searcher.search(&model).await.unwrap();
    assert_eq!(outcome.total, 3);
}

#[tokio::test]
async fn excluding_emits_not_in_clauses() {
    let searcher = seeded_searcher().await;
    let mut request = SearchRequest::new(1, 10).with_sort("name");
    request.excluding.insert(
        "statuses".to_string(),
        vec![bson::Bson::String("active".to_string())],
    );

    let outcome = searcher.search(&filter(request)).await.unwrap();
    let names: Vec<&str> = outcome
        .items
        .iter()
        .map(|employee| employee.name.as_str())
        .collect();
    assert_eq!(names, ["Donald", "Edsger", "Grace"]);
}

#[tokio::test]
async fn descending_sort_reverses_order() {
    let searcher = seeded_searcher().await;
    let outcome = searcher
        .search(&filter(SearchRequest::new(1, 2).with_sort("-level")))
        .await
        .unwrap();
    let levels: Vec<i64> = outcome.items.iter().map(|employee| employee.level).collect();
    assert_eq!(levels, [10, 9]);
}

#[tokio::test]
async fn combined_criteria_intersect() {
    let searcher = seeded_searcher().await;
    let mut model = filter(SearchRequest::new(1, 10).with_sort("name"));
    model.statuses = vec!["active".to_string()];
    model.level = Some(NumberRange {
        min: Some(7.0),
        ..NumberRange::default()
    });

    let outcome = searcher.search(&model).await.unwrap();
    let names: Vec<&str> = outcome
        .items
        .iter()
        .map(|employee| employee.name.as_str())
        .collect();
    assert_eq!(names, ["Ada", "Alan", "Barbara"]);
}
