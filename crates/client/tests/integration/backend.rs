use crate::common::*;
use anyhow::Result;
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType as ArrowType, Field as ArrowField, Schema as ArrowSchema};
use arrow::record_batch::RecordBatch;
use heavyai_client::{
    Backend, ClientError, ColumnSpec, CreateTableOptions, ExecutionMode, LoadMethod,
};
use heavyai_common::config::AppConfig;
use heavyai_error::ErrorCode;
use heavyai_sql::{DataType, Field, Schema};
use std::sync::atomic::Ordering;
use std::sync::Arc;

async fn backend(connector: &Arc<MockConnector>) -> Result<Backend> {
    Ok(Backend::connect(&config(), connector.clone()).await?)
}

#[tokio::test]
async fn test_missing_credentials_fail_before_connecting() {
    let connector = Arc::new(MockConnector::new());
    let mut cfg = config();
    cfg.connection.database = None;

    let err = Backend::connect(&cfg, connector.clone()).await.err().unwrap();
    assert!(matches!(err, ClientError::InvalidConnectionParams(_)));
    assert_eq!(
        err.to_string(),
        "If `session_id` is not provided, then the connection `uri` or all `user`, `password` and `database` must be provided."
    );
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_session_id_is_enough() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let mut cfg = AppConfig::default();
    cfg.connection.session_id = Some("Cb3ZqK9Rz".to_string());
    cfg.retry = fast_retry();

    Backend::connect(&cfg, connector.clone()).await?;
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_gpu_without_ipc_is_rejected() {
    let connector = Arc::new(MockConnector::new());
    let mut cfg = config();
    cfg.connection.gpu_device = Some(0);
    cfg.connection.ipc = Some(false);

    let err = Backend::connect(&cfg, connector.clone()).await.err().unwrap();
    assert!(matches!(err, ClientError::InvalidExecutionType));
    assert_eq!(err.to_heavyai_error().code, ErrorCode::InvalidExecutionType);
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gpu_device_selects_gpu_ipc() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let mut cfg = config();
    cfg.connection.gpu_device = Some(1);

    let backend = Backend::connect(&cfg, connector.clone()).await?;
    assert_eq!(backend.execution_mode(), ExecutionMode::GpuIpc { device: 1 });

    backend.raw_sql("SELECT 1").await?;
    let executed = connector.recorder.executed.lock().unwrap().clone();
    assert_eq!(executed, vec![("SELECT 1".to_string(), ExecutionMode::GpuIpc { device: 1 })]);
    Ok(())
}

#[tokio::test]
async fn test_connect_retries_transient_failures() -> Result<()> {
    let connector = Arc::new(MockConnector::new().failing(2));
    backend(&connector).await?;
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn test_connect_gives_up_after_max_attempts() {
    let connector = Arc::new(MockConnector::new().failing(10));
    let err = Backend::connect(&config(), connector.clone())
        .await
        .err()
        .unwrap();

    assert_eq!(connector.attempts.load(Ordering::SeqCst), 3);
    match err {
        ClientError::Connection { host, port, source } => {
            assert_eq!(host, "localhost");
            assert_eq!(port, 6274);
            assert!(source.to_string().contains("attempt 3"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_compiles_and_runs() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;
    let flights = backend.table("flights").await?;
    let expr = flights
        .filter(vec![flights.col("dep_delay").gt(30)])
        .select(vec![flights.col("origin")])
        .limit(5, 0);

    backend.execute(&expr).await?;
    let executed = connector.recorder.executed.lock().unwrap().clone();
    assert_eq!(
        executed,
        vec![(
            "SELECT origin\nFROM flights\nWHERE dep_delay > 30\nLIMIT 5".to_string(),
            ExecutionMode::Cursor
        )]
    );
    Ok(())
}

#[tokio::test]
async fn test_translation_error_before_driver_call() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;
    let flights = backend.table("flights").await?;

    let err = backend
        .execute(&flights.union(&flights, false))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::Translation(_)));
    assert_eq!(err.to_heavyai_error().code, ErrorCode::UnsupportedStatement);
    assert!(connector.recorder.executed.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_driver_errors_carry_sql() -> Result<()> {
    let connector = Arc::new(MockConnector::new().failing_queries("Exception: Object 'nope' not found"));
    let backend = backend(&connector).await?;

    let err = backend.raw_sql("SELECT *\nFROM nope").await.err().unwrap();
    assert_eq!(
        err.to_string(),
        "Exception: Object 'nope' not found\n\nSELECT *\nFROM nope"
    );
    assert_eq!(err.to_heavyai_error().code, ErrorCode::ExecutionFailed);
    Ok(())
}

#[tokio::test]
async fn test_raw_sql_with_checks_execution_type() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    let err = backend
        .raw_sql_with("SELECT 1", Some(false), Some(0))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ClientError::InvalidExecutionType));

    backend.raw_sql_with("SELECT 1", Some(true), None).await?;
    let executed = connector.recorder.executed.lock().unwrap().clone();
    assert_eq!(executed, vec![("SELECT 1".to_string(), ExecutionMode::Ipc)]);
    Ok(())
}

#[tokio::test]
async fn test_schema_introspection() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    let schema = backend.get_schema("flights").await?;
    assert_eq!(schema.names(), vec!["origin", "dep_delay", "fare", "dep_time"]);
    assert_eq!(schema.field("dep_delay").unwrap().data_type, DataType::Int16);
    assert_eq!(
        schema.field("fare").unwrap().data_type,
        DataType::Decimal {
            precision: 10,
            scale: 2
        }
    );
    assert!(!schema.field("dep_time").unwrap().nullable);

    let details = backend.describe("airports").await?;
    assert_eq!(details[0].encoding, "NONE");

    assert!(matches!(
        backend.get_schema("missing").await,
        Err(ClientError::Driver(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_listing_with_pattern() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    assert_eq!(backend.list_tables(None).await?, vec!["airports", "flights"]);
    assert_eq!(backend.list_tables(Some("^fl")).await?, vec!["flights"]);
    assert_eq!(
        backend.list_databases(Some("flights")).await?,
        vec!["flights", "flights_2008"]
    );
    assert!(matches!(
        backend.list_tables(Some("[")).await,
        Err(ClientError::InvalidQuery(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_sql_wraps_query_as_derived_table() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    let q = backend.sql("SELECT a, b FROM t;").await?;
    assert_eq!(q.columns(), vec!["a", "b"]);
    assert_eq!(
        connector.recorder.validated.lock().unwrap().clone(),
        vec!["SELECT a, b FROM t".to_string()]
    );

    let expr = q.filter(vec![q.col("a").gt(1)]);
    assert_eq!(
        backend.compile(&expr)?,
        "SELECT *\nFROM (\n  SELECT a, b FROM t\n) t0\nWHERE a > 1"
    );
    Ok(())
}

#[tokio::test]
async fn test_sql_rejects_non_queries() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    for query in [
        "DROP TABLE flights",
        "SELECT 1; SELECT 2",
        "SELEC 1",
        "",
    ] {
        assert!(
            matches!(backend.sql(query).await, Err(ClientError::InvalidQuery(_))),
            "accepted: {query}"
        );
    }
    assert!(connector.recorder.validated.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_set_database_reconnects_on_change() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    backend.set_database("heavyai").await?;
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 1);

    backend.set_database("flights").await?;
    assert_eq!(connector.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(backend.current_database().await?, "flights");
    assert_eq!(connector.recorder.closed.load(Ordering::SeqCst), 1);
    assert_eq!(
        connector.recorder.databases.lock().unwrap().clone(),
        vec![Some("heavyai".to_string()), Some("flights".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn test_load_data_defaults_to_infer() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    let schema = Arc::new(ArrowSchema::new(vec![
        ArrowField::new("id", ArrowType::Int64, false),
        ArrowField::new("name", ArrowType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
        ],
    )?;

    backend.load_data("people", &batch, None).await?;
    backend
        .load_data("people", &batch, Some(LoadMethod::Columnar))
        .await?;

    assert_eq!(
        connector.recorder.loads.lock().unwrap().clone(),
        vec![
            ("people".to_string(), 3, LoadMethod::Infer),
            ("people".to_string(), 3, LoadMethod::Columnar),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_ddl_goes_through_the_driver() -> Result<()> {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("user", DataType::String, true),
    ]);

    let mut cfg = config();
    cfg.connection.gpu_device = Some(0);
    let connector = Arc::new(MockConnector::new());
    let backend = Backend::connect(&cfg, connector.clone()).await?;
    let flights = backend.table("flights").await?;

    backend
        .create_table("people", &schema, CreateTableOptions::default())
        .await?;
    backend
        .create_view("origins", &flights.select(vec![flights.col("origin")]))
        .await?;
    backend.drop_table("people", true).await?;

    let executed: Vec<(String, ExecutionMode)> = connector.recorder.executed.lock().unwrap().clone();
    assert_eq!(
        executed[0].0,
        "CREATE TABLE people (\n  id BIGINT NOT NULL,\n  \"user\" TEXT\n) WITH (FRAGMENT_SIZE = 32000000)"
    );
    assert_eq!(executed[0].1, ExecutionMode::Cursor);
    assert_eq!(executed[1].0, "CREATE VIEW origins AS\nSELECT origin\nFROM flights");
    assert_eq!(executed[2].0, "DROP TABLE IF EXISTS people");
    Ok(())
}

#[tokio::test]
async fn test_alter_table_statements() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    backend.rename_table("flights", "flights_2008").await?;
    backend
        .add_columns(
            "flights_2008",
            &[
                ColumnSpec::new("carrier", DataType::String).with_encoding("DICT(8)"),
                ColumnSpec::new("cancelled", DataType::Boolean)
                    .not_null()
                    .with_default(false),
            ],
        )
        .await?;
    backend
        .drop_columns("flights_2008", &["fare", "dep_time"])
        .await?;

    let executed: Vec<String> = connector
        .recorder
        .executed
        .lock()
        .unwrap()
        .iter()
        .map(|(sql, mode)| {
            assert_eq!(*mode, ExecutionMode::Cursor);
            sql.clone()
        })
        .collect();
    assert_eq!(
        executed,
        vec![
            "ALTER TABLE flights RENAME TO flights_2008",
            "ALTER TABLE flights_2008 ADD (carrier TEXT ENCODING DICT(8), cancelled BOOLEAN NOT NULL DEFAULT FALSE)",
            "ALTER TABLE flights_2008 DROP COLUMN fare, DROP COLUMN dep_time",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_drop_table_or_view() -> Result<()> {
    let connector = Arc::new(MockConnector::new().with_view("origins"));
    let backend = backend(&connector).await?;

    backend.drop_table_or_view("airports", false).await?;
    backend.drop_table_or_view("origins", false).await?;
    {
        let executed = connector.recorder.executed.lock().unwrap();
        let sent: Vec<&str> = executed.iter().map(|(sql, _)| sql.as_str()).collect();
        assert_eq!(
            sent,
            vec!["DROP TABLE airports", "DROP TABLE origins", "DROP VIEW origins"]
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_drop_table_or_view_reports_the_table_error() -> Result<()> {
    let connector = Arc::new(MockConnector::new().failing_queries("Table missing does not exist."));
    let backend = backend(&connector).await?;

    match backend.drop_table_or_view("missing", false).await {
        Err(ClientError::Execution { source, sql }) => {
            assert_eq!(source.to_string(), "Table missing does not exist.");
            assert_eq!(sql, "DROP TABLE missing");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(connector.recorder.executed.lock().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_existence_checks() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;

    assert!(backend.exists_database("flights").await?);
    assert!(!backend.exists_database("flights_2009").await?);
    assert!(backend.exists_table("airports").await?);
    assert!(!backend.exists_table("nope").await?);
    Ok(())
}

#[tokio::test]
async fn test_compiler_settings_are_applied() -> Result<()> {
    let mut cfg = config();
    cfg.compiler.non_equijoin_supported = false;
    let backend = Backend::connect(&cfg, Arc::new(MockConnector::new())).await?;

    let flights = backend.table("flights").await?;
    let airports = backend.table("airports").await?;
    let expr = flights.inner_join(&airports, vec![flights.col("origin").gt(airports.col("code"))]);

    let err = backend.compile(&expr).err().unwrap();
    assert_eq!(err.to_heavyai_error().code, ErrorCode::NonEquiJoin);
    Ok(())
}

#[tokio::test]
async fn test_version_and_close() -> Result<()> {
    let connector = Arc::new(MockConnector::new());
    let backend = backend(&connector).await?;
    assert_eq!(backend.version().await?, "7.1.0");
    backend.close().await?;
    assert_eq!(connector.recorder.closed.load(Ordering::SeqCst), 1);
    Ok(())
}
