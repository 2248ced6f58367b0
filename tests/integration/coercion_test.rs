//! Column coercion tests through the full runner path.
//!
//! Temporal-tagged columns must come back as parsed chrono values; every
//! other column must pass through in its driver-native representation.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use quarry::auth::StaticTicketCheck;
use quarry::client::{MockEngineClient, StatementOutput};
use quarry::config::EngineConfig;
use quarry::table::{CellValue, ColumnInfo};
use quarry::{QuarryError, Runner};
use serde_json::json;

fn runner() -> Runner {
    Runner::new(EngineConfig::default()).with_ticket_check(Box::new(StaticTicketCheck::valid()))
}

#[tokio::test]
async fn date_column_comes_back_as_date_object() {
    let client = MockEngineClient::new().with_output(StatementOutput::new(
        vec![ColumnInfo::new("day", "date")],
        vec![vec![json!("2024-01-15")]],
    ));

    let table = runner()
        .run_with_client("SELECT day FROM visits", Box::new(client))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        table.rows[0][0],
        CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    );
}

#[tokio::test]
async fn timestamp_column_comes_back_parsed() {
    let client = MockEngineClient::new().with_output(StatementOutput::new(
        vec![ColumnInfo::new("ts", "timestamp")],
        vec![vec![json!("2024-01-15 10:30:00.000")]],
    ));

    let table = runner()
        .run_with_client("SELECT ts FROM events", Box::new(client))
        .await
        .unwrap()
        .unwrap();

    let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();
    assert_eq!(table.rows[0][0], CellValue::Timestamp(expected));
}

#[tokio::test]
async fn mixed_columns_coerce_independently() {
    let client = MockEngineClient::new().with_output(StatementOutput::new(
        vec![
            ColumnInfo::new("day", "date"),
            ColumnInfo::new("views", "bigint"),
            ColumnInfo::new("page", "varchar"),
        ],
        vec![
            vec![json!("2024-01-15"), json!(120), json!("Main_Page")],
            vec![json!("2024-01-16"), json!(98), json!("Special:Search")],
        ],
    ));

    let table = runner()
        .run_with_client("SELECT day, views, page FROM pageviews", Box::new(client))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(
        table.rows[0],
        vec![
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            CellValue::Int(120),
            CellValue::Str("Main_Page".to_string()),
        ]
    );
    assert_eq!(table.rows[1][1], CellValue::Int(98));
}

#[tokio::test]
async fn non_temporal_tags_are_never_touched() {
    // A varchar that happens to hold a date-shaped string stays a string.
    let client = MockEngineClient::new().with_output(StatementOutput::new(
        vec![ColumnInfo::new("label", "varchar")],
        vec![vec![json!("2024-01-15")]],
    ));

    let table = runner()
        .run_with_client("SELECT label FROM t", Box::new(client))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(table.rows[0][0], CellValue::Str("2024-01-15".to_string()));
}

#[tokio::test]
async fn unparseable_temporal_value_is_a_coercion_error() {
    let client = MockEngineClient::new().with_output(StatementOutput::new(
        vec![ColumnInfo::new("day", "date")],
        vec![vec![json!("January 15th")]],
    ));
    let handle = client.handle();

    let err = runner()
        .run_with_client("SELECT day FROM t", Box::new(client))
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryError::Coercion(_)));
    assert!(err.to_string().contains("day"));
    // Coercion happens after execution; the connection is still released.
    assert!(handle.was_closed());
}

#[tokio::test]
async fn null_temporal_values_stay_null() {
    let client = MockEngineClient::new().with_output(StatementOutput::new(
        vec![ColumnInfo::new("day", "date")],
        vec![vec![json!("2024-01-15")], vec![serde_json::Value::Null]],
    ));

    let table = runner()
        .run_with_client("SELECT day FROM t", Box::new(client))
        .await
        .unwrap()
        .unwrap();

    assert!(table.rows[1][0].is_null());
}
