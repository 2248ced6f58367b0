//! Runner sequencing and resource-release tests.
//!
//! Drives the runner end to end against scripted mock clients: statement
//! ordering, last-result-wins, the no-result acknowledgment, failure
//! propagation, and guaranteed connection release.

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

fn output(columns: Vec<ColumnInfo>, rows: Vec<Vec<serde_json::Value>>) -> StatementOutput {
    StatementOutput::new(columns, rows)
}

#[tokio::test]
async fn select_one_returns_passthrough_value() {
    let client = MockEngineClient::new().with_output(output(
        vec![ColumnInfo::new("x", "integer")],
        vec![vec![json!(1)]],
    ));

    let table = runner()
        .run_with_client("SELECT 1 AS x", Box::new(client))
        .await
        .unwrap()
        .expect("expected a table");

    assert_eq!(table.column_names(), vec!["x"]);
    assert_eq!(table.rows, vec![vec![CellValue::Int(1)]]);
}

#[tokio::test]
async fn last_statement_result_wins() {
    // CREATE acknowledges, SELECT returns an empty table with column `a`.
    let client = MockEngineClient::new()
        .with_ack()
        .with_output(output(vec![ColumnInfo::new("a", "integer")], vec![]));
    let handle = client.handle();

    let table = runner()
        .run_with_client(
            vec!["CREATE TABLE t (a int)", "SELECT * FROM t"],
            Box::new(client),
        )
        .await
        .unwrap()
        .expect("expected the SELECT's table, not the CREATE acknowledgment");

    assert_eq!(table.column_names(), vec!["a"]);
    assert!(table.is_empty());
    assert_eq!(
        handle.executed(),
        vec!["CREATE TABLE t (a int)", "SELECT * FROM t"]
    );
    assert!(handle.was_closed());
}

#[tokio::test]
async fn earlier_results_are_discarded() {
    let client = MockEngineClient::new()
        .with_output(output(
            vec![ColumnInfo::new("first", "integer")],
            vec![vec![json!(1)]],
        ))
        .with_output(output(
            vec![ColumnInfo::new("second", "integer")],
            vec![vec![json!(2)]],
        ));

    let table = runner()
        .run_with_client(
            vec!["SELECT 1 AS first", "SELECT 2 AS second"],
            Box::new(client),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(table.column_names(), vec!["second"]);
    assert_eq!(table.rows, vec![vec![CellValue::Int(2)]]);
}

#[tokio::test]
async fn insert_alone_returns_absent_marker() {
    let client = MockEngineClient::new().with_ack();

    let result = runner()
        .run_with_client("INSERT INTO t VALUES (1)", Box::new(client))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn ack_as_last_statement_overrides_earlier_table() {
    let client = MockEngineClient::new()
        .with_output(output(
            vec![ColumnInfo::new("x", "integer")],
            vec![vec![json!(1)]],
        ))
        .with_ack();

    let result = runner()
        .run_with_client(
            vec!["SELECT 1 AS x", "INSERT INTO t VALUES (1)"],
            Box::new(client),
        )
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn false_valued_results_column_is_a_real_table() {
    // Only the exact [[true]] / "results" shape is an acknowledgment.
    let client = MockEngineClient::new().with_output(output(
        vec![ColumnInfo::new("results", "boolean")],
        vec![vec![json!(false)]],
    ));

    let table = runner()
        .run_with_client("SELECT false AS results", Box::new(client))
        .await
        .unwrap()
        .expect("a false value is a genuine one-cell table");

    assert_eq!(table.rows, vec![vec![CellValue::Bool(false)]]);
}

#[tokio::test]
async fn single_string_equals_one_element_list() {
    let client_a = MockEngineClient::new().with_output(output(
        vec![ColumnInfo::new("x", "integer")],
        vec![vec![json!(1)]],
    ));
    let client_b = MockEngineClient::new().with_output(output(
        vec![ColumnInfo::new("x", "integer")],
        vec![vec![json!(1)]],
    ));

    let from_string = runner()
        .run_with_client("SELECT 1 AS x", Box::new(client_a))
        .await
        .unwrap();
    let from_list = runner()
        .run_with_client(vec!["SELECT 1 AS x"], Box::new(client_b))
        .await
        .unwrap();

    assert_eq!(from_string, from_list);
}

#[tokio::test]
async fn failure_mid_sequence_aborts_and_releases_connection() {
    let client = MockEngineClient::new()
        .with_output(output(
            vec![ColumnInfo::new("x", "integer")],
            vec![vec![json!(1)]],
        ))
        .with_failure("Table nope does not exist")
        .with_output(output(vec![ColumnInfo::new("y", "integer")], vec![]));
    let handle = client.handle();

    let err = runner()
        .run_with_client(
            vec!["SELECT 1 AS x", "SELECT * FROM nope", "SELECT 2 AS y"],
            Box::new(client),
        )
        .await
        .unwrap_err();

    match err {
        QuarryError::Execution {
            index,
            sql,
            message,
        } => {
            assert_eq!(index, 1);
            assert_eq!(sql, "SELECT * FROM nope");
            assert_eq!(message, "Table nope does not exist");
        }
        other => panic!("expected Execution error, got {other:?}"),
    }

    // The third statement never ran, and the connection was released.
    assert_eq!(
        handle.executed(),
        vec!["SELECT 1 AS x", "SELECT * FROM nope"]
    );
    assert!(handle.was_closed());
}

#[tokio::test]
async fn failure_on_first_statement_releases_connection() {
    let client = MockEngineClient::new().with_failure("syntax error");
    let handle = client.handle();

    let result = runner()
        .run_with_client(vec!["SELEKT 1", "SELECT 1"], Box::new(client))
        .await;

    assert!(result.is_err());
    assert_eq!(handle.executed(), vec!["SELEKT 1"]);
    assert!(handle.was_closed());
}

#[tokio::test]
async fn close_failure_does_not_mask_statement_failure() {
    // When a statement fails and releasing the connection then fails too,
    // the caller must still see the original execution error.
    let client = MockEngineClient::new()
        .with_failure("Table nope does not exist")
        .with_close_failure("connection already gone");
    let handle = client.handle();

    let err = runner()
        .run_with_client("SELECT * FROM nope", Box::new(client))
        .await
        .unwrap_err();

    match err {
        QuarryError::Execution { index, message, .. } => {
            assert_eq!(index, 0);
            assert_eq!(message, "Table nope does not exist");
        }
        other => panic!("expected the original Execution error, got {other:?}"),
    }
    assert!(handle.was_closed());
}

#[tokio::test]
async fn close_failure_on_success_path_is_reported() {
    let client = MockEngineClient::new()
        .with_output(output(
            vec![ColumnInfo::new("x", "integer")],
            vec![vec![json!(1)]],
        ))
        .with_close_failure("connection already gone");

    let err = runner()
        .run_with_client("SELECT 1 AS x", Box::new(client))
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryError::Connection(_)));
}

#[tokio::test]
async fn expired_ticket_fails_before_any_statement() {
    let runner = Runner::new(EngineConfig::default())
        .with_ticket_check(Box::new(StaticTicketCheck::invalid()));
    let client = MockEngineClient::new();
    let handle = client.handle();

    let err = runner
        .run_with_client("SELECT 1", Box::new(client))
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryError::Authentication(_)));
    assert!(handle.executed().is_empty());
}

#[tokio::test]
async fn success_path_releases_connection_too() {
    let client = MockEngineClient::new().with_output(output(
        vec![ColumnInfo::new("x", "integer")],
        vec![vec![json!(1)]],
    ));
    let handle = client.handle();

    runner()
        .run_with_client("SELECT 1 AS x", Box::new(client))
        .await
        .unwrap();

    assert!(handle.was_closed());
}
