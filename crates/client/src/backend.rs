use crate::ddl::{self, ColumnSpec, CreateTableOptions};
use crate::driver::{
    schema_from_details, ColumnDetails, ConnectParams, DriverConnector, ExecutionMode,
    HeavyDbDriver, LoadMethod, QueryResult,
};
use crate::error::ClientError;
use crate::udf::{RemoteCompiler, UdfRegistry};
use arrow::record_batch::RecordBatch;
use heavyai_common::config::{AppConfig, CompilerSettings, RetrySettings};
use heavyai_common::retry::retry_async;
use heavyai_sql::dialect_router::route_dialect;
use heavyai_sql::ir::TableExpr;
use heavyai_sql::{Compiler, Schema};
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

struct Session {
    driver: Arc<dyn HeavyDbDriver>,
    params: ConnectParams,
}

/// A connected HeavyDB backend: compiles expressions and runs them through the driver.
pub struct Backend {
    connector: Arc<dyn DriverConnector>,
    session: RwLock<Session>,
    mode: ExecutionMode,
    compiler: Compiler,
    retry: RetrySettings,
    udfs: Option<UdfRegistry>,
}

fn build_compiler(settings: &CompilerSettings) -> Result<Compiler, ClientError> {
    let dialect = route_dialect(&settings.dialect).ok_or_else(|| {
        ClientError::Config(format!("No dialect available for '{}'", settings.dialect))
    })?;
    let dialect = (*dialect)
        .clone()
        .with_non_equijoin_supported(settings.non_equijoin_supported)
        .with_always_alias(settings.always_alias)
        .with_max_depth(settings.max_depth);
    Ok(Compiler::new(Arc::new(dialect)))
}

async fn open(
    connector: &dyn DriverConnector,
    params: &ConnectParams,
    retry: RetrySettings,
) -> Result<Arc<dyn HeavyDbDriver>, ClientError> {
    retry_async("heavydb_connect", retry, || connector.connect(params))
        .await
        .map_err(|source| ClientError::Connection {
            host: params.host.clone(),
            port: params.port,
            source,
        })
}

/// Drop trailing semicolons, keeping any comment that followed them.
fn strip_semicolons(query: &str) -> String {
    static COMMENTED: OnceLock<Regex> = OnceLock::new();
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    let commented = COMMENTED.get_or_init(|| Regex::new(r"\s*;\s*--").unwrap());
    let trailing = TRAILING.get_or_init(|| Regex::new(r"\s*;\s*$").unwrap());

    let query = commented.replace_all(query.trim(), "\n--");
    trailing.replace(&query, "").into_owned()
}

fn like_filter(names: Vec<String>, like: Option<&str>) -> Result<Vec<String>, ClientError> {
    let Some(pattern) = like else {
        return Ok(names);
    };
    let re = Regex::new(pattern)
        .map_err(|e| ClientError::InvalidQuery(format!("Invalid pattern '{}': {}", pattern, e)))?;
    Ok(names.into_iter().filter(|name| re.is_match(name)).collect())
}

impl Backend {
    pub async fn connect(
        config: &AppConfig,
        connector: Arc<dyn DriverConnector>,
    ) -> Result<Self, ClientError> {
        let params = ConnectParams::from_config(&config.connection)?;
        let mode = ExecutionMode::resolve(config.connection.ipc, config.connection.gpu_device)?;
        let compiler = build_compiler(&config.compiler)?;

        let driver = open(connector.as_ref(), &params, config.retry).await?;
        tracing::info!(
            target: "heavyai_client",
            host = %params.host,
            port = params.port,
            protocol = params.protocol.as_str(),
            auth = params.target_kind(),
            mode = ?mode,
            "Connected to HeavyDB"
        );

        Ok(Self {
            connector,
            session: RwLock::new(Session { driver, params }),
            mode,
            compiler,
            retry: config.retry,
            udfs: None,
        })
    }

    pub fn with_remote_compiler(mut self, compiler: Arc<dyn RemoteCompiler>) -> Self {
        self.udfs = Some(UdfRegistry::new(compiler));
        self
    }

    pub fn udf(&self) -> Result<&UdfRegistry, ClientError> {
        self.udfs
            .as_ref()
            .ok_or_else(|| ClientError::Config("No remote UDF compiler configured".to_string()))
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    async fn driver(&self) -> Arc<dyn HeavyDbDriver> {
        self.session.read().await.driver.clone()
    }

    pub fn compile(&self, expr: &TableExpr) -> Result<String, ClientError> {
        Ok(self.compiler.compile(expr)?)
    }

    /// Compile and run `expr`.
    pub async fn execute(&self, expr: &TableExpr) -> Result<QueryResult, ClientError> {
        let sql = self.compile(expr)?;
        self.run(sql, self.mode).await
    }

    pub async fn raw_sql(&self, sql: &str) -> Result<QueryResult, ClientError> {
        self.run(sql.to_string(), self.mode).await
    }

    /// Run `sql` with an execution mode other than the connection's.
    pub async fn raw_sql_with(
        &self,
        sql: &str,
        ipc: Option<bool>,
        gpu_device: Option<u32>,
    ) -> Result<QueryResult, ClientError> {
        let mode = ExecutionMode::resolve(ipc, gpu_device)?;
        self.run(sql.to_string(), mode).await
    }

    async fn run(&self, sql: String, mode: ExecutionMode) -> Result<QueryResult, ClientError> {
        tracing::debug!(target: "heavyai_client", sql = %sql, mode = ?mode, "Executing query");
        let driver = self.driver().await;
        match driver.execute(&sql, mode).await {
            Ok(result) => Ok(result),
            Err(source) => {
                tracing::error!(target: "heavyai_client", error = %source, "Query failed");
                Err(ClientError::Execution { source, sql })
            }
        }
    }

    /// Wrap a user-written SELECT as a table expression.
    pub async fn sql(&self, query: &str) -> Result<TableExpr, ClientError> {
        let query = strip_semicolons(query);
        let statements = Parser::parse_sql(&GenericDialect {}, &query)
            .map_err(|e| ClientError::InvalidQuery(e.to_string()))?;
        match statements.as_slice() {
            [Statement::Query(_)] => {}
            [] => return Err(ClientError::InvalidQuery("Empty query".to_string())),
            [_] => {
                return Err(ClientError::InvalidQuery(
                    "Only SELECT queries can be used as a table expression".to_string(),
                ))
            }
            many => {
                return Err(ClientError::InvalidQuery(format!(
                    "Expected a single statement, got {}",
                    many.len()
                )))
            }
        }

        let driver = self.driver().await;
        let details = match driver.sql_validate(&query).await {
            Ok(details) => details,
            Err(source) => return Err(ClientError::Execution { source, sql: query }),
        };
        let schema = schema_from_details(&details)?;
        Ok(TableExpr::sql(query, schema))
    }

    pub async fn describe(&self, table: &str) -> Result<Vec<ColumnDetails>, ClientError> {
        self.driver()
            .await
            .get_table_details(table)
            .await
            .map_err(ClientError::Driver)
    }

    pub async fn get_schema(&self, table: &str) -> Result<Schema, ClientError> {
        let details = self.describe(table).await?;
        Ok(schema_from_details(&details)?)
    }

    pub async fn table(&self, name: &str) -> Result<TableExpr, ClientError> {
        let schema = self.get_schema(name).await?;
        Ok(TableExpr::table(name, schema))
    }

    pub async fn list_tables(&self, like: Option<&str>) -> Result<Vec<String>, ClientError> {
        let tables = self
            .driver()
            .await
            .get_tables()
            .await
            .map_err(ClientError::Driver)?;
        like_filter(tables, like)
    }

    pub async fn list_databases(&self, like: Option<&str>) -> Result<Vec<String>, ClientError> {
        let databases = self
            .driver()
            .await
            .get_databases()
            .await
            .map_err(ClientError::Driver)?;
        like_filter(databases, like)
    }

    pub async fn current_database(&self) -> Result<String, ClientError> {
        self.driver()
            .await
            .current_database()
            .await
            .map_err(ClientError::Driver)
    }

    /// Switch to another database, reconnecting only if it differs from the current one.
    pub async fn set_database(&self, name: &str) -> Result<(), ClientError> {
        let mut session = self.session.write().await;
        if session.params.database.as_deref() == Some(name) {
            return Ok(());
        }

        let params = session.params.with_database(name);
        let driver = open(self.connector.as_ref(), &params, self.retry).await?;
        if let Err(e) = session.driver.close().await {
            tracing::warn!(target: "heavyai_client", error = %e, "Failed to close previous session");
        }
        tracing::info!(target: "heavyai_client", database = %name, "Switched database");
        *session = Session { driver, params };
        Ok(())
    }

    pub async fn version(&self) -> Result<String, ClientError> {
        self.driver()
            .await
            .server_version()
            .await
            .map_err(ClientError::Driver)
    }

    pub async fn load_data(
        &self,
        table: &str,
        batch: &RecordBatch,
        method: Option<LoadMethod>,
    ) -> Result<(), ClientError> {
        let method = method.unwrap_or_default();
        tracing::debug!(
            target: "heavyai_client",
            table = %table,
            rows = batch.num_rows(),
            method = method.as_str(),
            "Loading data"
        );
        self.driver()
            .await
            .load_table(table, batch, method)
            .await
            .map_err(ClientError::Driver)
    }

    async fn run_ddl(&self, sql: String) -> Result<(), ClientError> {
        self.run(sql, ExecutionMode::Cursor).await.map(|_| ())
    }

    /// Create an empty table with the given schema.
    pub async fn create_table(
        &self,
        name: &str,
        schema: &Schema,
        options: CreateTableOptions,
    ) -> Result<(), ClientError> {
        let sql = ddl::create_table(name, schema, &options, self.mode.is_gpu())?;
        self.run_ddl(sql).await
    }

    /// Create a table populated from the result of `expr`.
    pub async fn create_table_from(&self, name: &str, expr: &TableExpr) -> Result<(), ClientError> {
        let select = self.compile(expr)?;
        self.run_ddl(ddl::create_table_as(name, &select)?).await
    }

    pub async fn create_view(&self, name: &str, expr: &TableExpr) -> Result<(), ClientError> {
        let select = self.compile(expr)?;
        self.run_ddl(ddl::create_view(name, &select)?).await
    }

    /// With `force`, a missing table is not an error.
    pub async fn drop_table(&self, name: &str, force: bool) -> Result<(), ClientError> {
        self.run_ddl(ddl::drop_table(name, force)?).await
    }

    pub async fn drop_view(&self, name: &str, force: bool) -> Result<(), ClientError> {
        self.run_ddl(ddl::drop_view(name, force)?).await
    }

    /// Drop `name` as a table, falling back to a view. When both fail the table
    /// error is returned.
    pub async fn drop_table_or_view(&self, name: &str, force: bool) -> Result<(), ClientError> {
        let Err(table_err) = self.drop_table(name, false).await else {
            return Ok(());
        };
        match self.drop_view(name, force).await {
            Ok(()) => Ok(()),
            Err(view_err) => {
                tracing::debug!(
                    target: "heavyai_client",
                    name,
                    error = %view_err,
                    "Dropping as a view failed too"
                );
                Err(table_err)
            }
        }
    }

    pub async fn rename_table(&self, name: &str, new_name: &str) -> Result<(), ClientError> {
        self.run_ddl(ddl::rename_table(name, new_name)?).await
    }

    pub async fn add_columns(&self, table: &str, columns: &[ColumnSpec]) -> Result<(), ClientError> {
        self.run_ddl(ddl::add_columns(table, columns, &self.compiler)?)
            .await
    }

    pub async fn drop_columns(&self, table: &str, names: &[&str]) -> Result<(), ClientError> {
        self.run_ddl(ddl::drop_columns(table, names)?).await
    }

    pub async fn truncate_table(&self, name: &str) -> Result<(), ClientError> {
        self.run_ddl(ddl::truncate_table(name)?).await
    }

    pub async fn exists_table(&self, name: &str) -> Result<bool, ClientError> {
        Ok(self.list_tables(None).await?.iter().any(|t| t == name))
    }

    pub async fn exists_database(&self, name: &str) -> Result<bool, ClientError> {
        Ok(self.list_databases(None).await?.iter().any(|d| d == name))
    }

    pub async fn close(&self) -> Result<(), ClientError> {
        self.driver()
            .await
            .close()
            .await
            .map_err(ClientError::Driver)
    }
}
