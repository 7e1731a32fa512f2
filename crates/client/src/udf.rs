//! User-defined functions compiled and registered on the server.

use crate::error::ClientError;
use anyhow::Result;
use async_trait::async_trait;
use heavyai_sql::ir::Expr;
use heavyai_sql::{DataType, SqlGenError};
use std::sync::Arc;

/// Source of a function to be compiled remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdfSource {
    pub name: String,
    pub body: String,
}

impl UdfSource {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// The server-side compiler for UDF sources.
#[async_trait]
pub trait RemoteCompiler: Send + Sync {
    /// Compile `source` for the given signature, e.g. `float64(float64, float64)`.
    async fn compile(&self, source: &UdfSource, signature: &str) -> Result<()>;

    /// Make everything compiled so far callable from SQL.
    async fn register(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct UdfRegistry {
    compiler: Arc<dyn RemoteCompiler>,
}

impl UdfRegistry {
    pub fn new(compiler: Arc<dyn RemoteCompiler>) -> Self {
        Self { compiler }
    }

    pub fn elementwise(&self, inputs: Vec<DataType>, output: DataType) -> ElementwiseBuilder {
        ElementwiseBuilder {
            compiler: self.compiler.clone(),
            inputs,
            output,
        }
    }

    pub fn reduction(&self) -> Result<(), ClientError> {
        Err(ClientError::NotImplemented("Reduction UDFs"))
    }

    pub fn analytic(&self) -> Result<(), ClientError> {
        Err(ClientError::NotImplemented("Analytic UDFs"))
    }
}

pub struct ElementwiseBuilder {
    compiler: Arc<dyn RemoteCompiler>,
    inputs: Vec<DataType>,
    output: DataType,
}

impl ElementwiseBuilder {
    /// Signature string handed to the remote compiler.
    pub fn signature(&self) -> Result<String, ClientError> {
        for ty in self.inputs.iter().chain(std::iter::once(&self.output)) {
            ty.dialect_name()
                .map_err(|_| ClientError::UnsupportedType(ty.to_string()))?;
        }
        let inputs = self
            .inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("{}({})", self.output, inputs))
    }

    /// Bind to a function already registered on the server.
    pub fn named(self, name: impl Into<String>) -> ElementwiseUdf {
        ElementwiseUdf {
            name: name.into(),
            inputs: self.inputs,
            output: self.output,
        }
    }

    pub async fn compile(self, source: &UdfSource) -> Result<ElementwiseUdf, ClientError> {
        let signature = self.signature()?;
        let remote_error = |source_err: anyhow::Error| ClientError::RemoteCompile {
            name: source.name.clone(),
            source: source_err,
        };

        tracing::debug!(
            target: "heavyai_client",
            udf = %source.name,
            signature = %signature,
            "Compiling UDF"
        );
        self.compiler
            .compile(source, &signature)
            .await
            .map_err(remote_error)?;
        self.compiler.register().await.map_err(remote_error)?;
        tracing::info!(target: "heavyai_client", udf = %source.name, "Registered UDF");

        Ok(self.named(source.name.clone()))
    }
}

/// A callable elementwise UDF.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementwiseUdf {
    name: String,
    inputs: Vec<DataType>,
    output: DataType,
}

impl ElementwiseUdf {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> &DataType {
        &self.output
    }

    pub fn call(&self, args: Vec<Expr>) -> Result<Expr, ClientError> {
        if args.len() != self.inputs.len() {
            return Err(SqlGenError::ArityMismatch {
                function: self.name.clone(),
                expected: self.inputs.len().to_string(),
                actual: args.len(),
            }
            .into());
        }
        Ok(Expr::Udf {
            name: self.name.clone(),
            args,
            output: self.output.clone(),
        })
    }
}
