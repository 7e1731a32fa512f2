use crate::dialects::{heavydb_registry, OperatorRegistry};
use crate::ir::JoinKind;
use crate::optimizer::RewriteSet;
use crate::sql_generator::error::SqlGenError;
use crate::types::DataType;
use std::sync::Arc;

pub trait TypeMapper: Send + Sync {
    fn map_type(&self, data_type: &DataType) -> Result<String, SqlGenError>;
}

/// Maps host types to HeavyDB DDL/CAST type names.
pub struct HeavyDbTypeMapper;
impl TypeMapper for HeavyDbTypeMapper {
    fn map_type(&self, data_type: &DataType) -> Result<String, SqlGenError> {
        data_type.sql_type()
    }
}

/// Everything the generator needs to know about the target dialect.
#[derive(Clone)]
pub struct DialectConfig {
    pub name: &'static str,
    pub display_name: &'static str,
    pub registry: Arc<OperatorRegistry>,
    pub rewrites: Arc<RewriteSet>,
    pub type_mapper: Arc<dyn TypeMapper>,
    /// Emit table aliases and `AS` for every projection, even when not needed.
    pub always_alias: bool,
    pub non_equijoin_supported: bool,
    pub supports_union: bool,
    /// Spaces per indentation level in nested output.
    pub indent: usize,
    pub max_depth: usize,
}

impl std::fmt::Debug for DialectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectConfig")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("always_alias", &self.always_alias)
            .field("non_equijoin_supported", &self.non_equijoin_supported)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::heavydb()
    }
}

impl DialectConfig {
    pub fn heavydb() -> Self {
        Self {
            name: "heavydb",
            display_name: "HeavyDB",
            registry: heavydb_registry(),
            rewrites: Arc::new(RewriteSet::heavydb()),
            type_mapper: Arc::new(HeavyDbTypeMapper),
            always_alias: false,
            non_equijoin_supported: true,
            supports_union: false,
            indent: 2,
            max_depth: 256,
        }
    }

    /// Keyword used for each join kind, or `None` when HeavyDB cannot express it.
    ///
    /// Semi joins are emitted as plain inner joins.
    pub fn join_label(&self, kind: JoinKind) -> Option<&'static str> {
        match kind {
            JoinKind::Inner | JoinKind::LeftSemi | JoinKind::Cross => Some("JOIN"),
            JoinKind::Left => Some("LEFT JOIN"),
            JoinKind::Right | JoinKind::Outer | JoinKind::LeftAnti => None,
        }
    }

    pub fn with_always_alias(mut self, always_alias: bool) -> Self {
        self.always_alias = always_alias;
        self
    }

    pub fn with_non_equijoin_supported(mut self, supported: bool) -> Self {
        self.non_equijoin_supported = supported;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
