use crate::common::*;
use anyhow::Result;
use heavyai_client::{Backend, ClientError, UdfRegistry, UdfSource};
use heavyai_sql::{Compiler, DataType, Schema};
use heavyai_sql::ir::TableExpr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn points() -> TableExpr {
    TableExpr::table(
        "points",
        Schema::from_pairs([("x", DataType::Float64), ("y", DataType::Float64)]),
    )
}

#[test]
fn test_signature_from_host_types() -> Result<()> {
    let registry = UdfRegistry::new(Arc::new(MockRemoteCompiler::default()));
    let builder = registry.elementwise(vec![DataType::Float64, DataType::Int32], DataType::Float64);
    assert_eq!(builder.signature()?, "float64(float64, int32)");

    let nullary = registry.elementwise(vec![], DataType::Boolean);
    assert_eq!(nullary.signature()?, "boolean()");

    let binary = registry.elementwise(vec![DataType::Binary], DataType::Int64);
    assert!(matches!(binary.signature(), Err(ClientError::UnsupportedType(_))));
    Ok(())
}

#[tokio::test]
async fn test_compile_then_register() -> Result<()> {
    let remote = Arc::new(MockRemoteCompiler::default());
    let registry = UdfRegistry::new(remote.clone());

    let udf = registry
        .elementwise(vec![DataType::Float64, DataType::Float64], DataType::Float64)
        .compile(&UdfSource::new("hypot", "return sqrt(x * x + y * y)"))
        .await?;

    assert_eq!(udf.name(), "hypot");
    assert_eq!(
        remote.compiled.lock().unwrap().clone(),
        vec![("hypot".to_string(), "float64(float64, float64)".to_string())]
    );
    assert_eq!(remote.registrations.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_named_skips_compilation() -> Result<()> {
    let remote = Arc::new(MockRemoteCompiler::default());
    let registry = UdfRegistry::new(remote.clone());

    let udf = registry
        .elementwise(vec![DataType::Float64], DataType::Float64)
        .named("existing_fn");

    let t = points();
    let expr = t.select(vec![udf.call(vec![t.col("x")])?.name("fx")]);
    assert_eq!(
        Compiler::heavydb().compile(&expr)?,
        "SELECT existing_fn(x) AS fx\nFROM points"
    );
    assert!(remote.compiled.lock().unwrap().is_empty());
    assert_eq!(remote.registrations.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_remote_failure_is_not_retried() {
    let remote = Arc::new(MockRemoteCompiler {
        fail: true,
        ..Default::default()
    });
    let registry = UdfRegistry::new(remote.clone());

    let err = registry
        .elementwise(vec![DataType::Float64], DataType::Float64)
        .compile(&UdfSource::new("broken", "return x +"))
        .await
        .unwrap_err();

    match &err {
        ClientError::RemoteCompile { name, source } => {
            assert_eq!(name, "broken");
            assert_eq!(source.to_string(), "NVVM compilation failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(remote.compiled.lock().unwrap().len(), 1);
    assert_eq!(remote.registrations.load(Ordering::SeqCst), 0);
}

#[test]
fn test_call_checks_arity() {
    let registry = UdfRegistry::new(Arc::new(MockRemoteCompiler::default()));
    let udf = registry
        .elementwise(vec![DataType::Float64, DataType::Float64], DataType::Float64)
        .named("hypot");

    let t = points();
    assert!(udf.call(vec![t.col("x"), t.col("y")]).is_ok());
    assert!(matches!(
        udf.call(vec![t.col("x")]),
        Err(ClientError::Translation(heavyai_sql::SqlGenError::ArityMismatch { actual: 1, .. }))
    ));
}

#[test]
fn test_reduction_and_analytic_not_implemented() {
    let registry = UdfRegistry::new(Arc::new(MockRemoteCompiler::default()));
    assert!(matches!(registry.reduction(), Err(ClientError::NotImplemented(_))));
    assert!(matches!(registry.analytic(), Err(ClientError::NotImplemented(_))));
}

#[tokio::test]
async fn test_backend_udf_registry() -> Result<()> {
    let backend = Backend::connect(&config(), Arc::new(MockConnector::new())).await?;
    assert!(matches!(backend.udf(), Err(ClientError::Config(_))));

    let backend = backend.with_remote_compiler(Arc::new(MockRemoteCompiler::default()));
    let udf = backend
        .udf()?
        .elementwise(vec![DataType::Float64], DataType::Float64)
        .compile(&UdfSource::new("double_it", "return 2.0 * x"))
        .await?;

    let t = points();
    let expr = t.filter(vec![udf.call(vec![t.col("y")])?.gt(1)]);
    assert_eq!(
        backend.compile(&expr)?,
        "SELECT *\nFROM points\nWHERE double_it(y) > 1"
    );
    Ok(())
}
