use crate::ir::{ColumnRef, Relation};
use crate::sql_generator::error::SqlGenError;
use crate::sql_generator::sanitize::safe_ident;
use std::sync::Arc;

/// One relation visible in a FROM clause.
#[derive(Debug, Clone)]
pub struct ScopeEntry {
    pub relation: Arc<Relation>,
    /// The alias of this relation (e.g., "t0"), if the scope uses aliases
    pub alias: Option<String>,
    /// Columns exposed by this relation
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub entries: Vec<ScopeEntry>,
    /// Whether column references are written as `alias.column`
    pub qualify: bool,
    /// Relations folded into this FROM clause without being one of its entries
    /// (filters fused into the table set, the join tree itself).
    pub pass_through: Vec<Arc<Relation>>,
    /// The statement's own select list, referenced bare by output name.
    pub outputs: Option<(Arc<Relation>, Vec<String>)>,
}

impl Scope {
    fn aliases_for(&self, name: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.columns.iter().any(|c| c == name))
            .map(|e| match &e.alias {
                Some(alias) => format!("{}.{}", alias, name),
                None => name.to_string(),
            })
            .collect()
    }

    fn available(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|e| e.columns.iter().cloned())
            .collect()
    }

    fn by_name(&self, name: &str) -> Result<&ScopeEntry, SqlGenError> {
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.columns.iter().any(|c| c == name));
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(entry),
            (Some(_), Some(_)) => Err(SqlGenError::AmbiguousColumn {
                name: name.to_string(),
                candidates: self.aliases_for(name),
            }),
            (None, _) => Err(SqlGenError::ColumnNotFound {
                column: name.to_string(),
                available: self.available(),
            }),
        }
    }

    fn checked<'a>(&self, entry: &'a ScopeEntry, name: &str) -> Result<&'a ScopeEntry, SqlGenError> {
        if entry.columns.iter().any(|c| c == name) {
            Ok(entry)
        } else {
            Err(SqlGenError::ColumnNotFound {
                column: name.to_string(),
                available: entry.columns.clone(),
            })
        }
    }

    /// Find the entry a column reference belongs to.
    ///
    /// Order: the exact relation, then relations folded into this scope, then the entry
    /// whose relation was built from the referenced one, then a unique name match.
    pub fn resolve(&self, col: &ColumnRef) -> Result<&ScopeEntry, SqlGenError> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| Arc::ptr_eq(&e.relation, &col.relation))
        {
            return self.checked(entry, &col.name);
        }

        if self
            .pass_through
            .iter()
            .any(|r| Arc::ptr_eq(r, &col.relation))
        {
            return self.by_name(&col.name);
        }

        let containing: Vec<&ScopeEntry> = self
            .entries
            .iter()
            .filter(|e| e.relation.contains(&col.relation))
            .collect();
        match containing.as_slice() {
            [entry] => self.checked(*entry, &col.name),
            _ => self.by_name(&col.name),
        }
    }
}

/// Represents a state in the scope stack that can be rolled back to.
pub struct Checkpoint {
    pub(crate) stack_len: usize,
}

/// Per-statement translation state.
pub struct QueryContext {
    always_alias: bool,
    /// Global counter for deterministic aliases (t0, t1...)
    counter: usize,
    /// Stack of visible scopes, from outermost to innermost
    scope_stack: Vec<Scope>,
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new(false)
    }
}

impl QueryContext {
    pub fn new(always_alias: bool) -> Self {
        Self {
            always_alias,
            counter: 0,
            scope_stack: Vec::new(),
        }
    }

    pub fn always_alias(&self) -> bool {
        self.always_alias
    }

    /// Assign next systematic alias and increment counter
    pub fn next_alias(&mut self) -> String {
        let alias = format!("t{}", self.counter);
        self.counter += 1;
        alias
    }

    pub fn push_scope(&mut self, scope: Scope) {
        self.scope_stack.push(scope);
        tracing::trace!(target: "sql_generator", stack_len = self.scope_stack.len(), "Pushed scope");
    }

    /// Pop the current scope (e.g. leaving a subquery)
    pub fn pop_scope(&mut self) {
        if self.scope_stack.pop().is_none() {
            tracing::warn!(target: "sql_generator", "Attempted to pop scope from empty stack");
        } else {
            tracing::trace!(target: "sql_generator", stack_len = self.scope_stack.len(), "Popped scope");
        }
    }

    /// Get the current (top) scope
    pub fn current_scope(&self) -> Option<&Scope> {
        self.scope_stack.last()
    }

    pub fn scope_stack_len(&self) -> usize {
        self.scope_stack.len()
    }

    /// Create a checkpoint of the current scope stack state.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            stack_len: self.scope_stack.len(),
        }
    }

    /// Roll back the scope stack to a previously created checkpoint.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        if self.scope_stack.len() > checkpoint.stack_len {
            let diff = self.scope_stack.len() - checkpoint.stack_len;
            tracing::trace!(target: "sql_generator", count = diff, "Rolling back scopes");
            self.scope_stack.truncate(checkpoint.stack_len);
        }
    }

    /// Render a column reference against the current scope, qualified when the scope
    /// uses aliases.
    pub fn resolve_column(&self, col: &ColumnRef) -> Result<String, SqlGenError> {
        let scope = self.current_scope().ok_or_else(|| SqlGenError::ColumnNotFound {
            column: col.name.clone(),
            available: vec![],
        })?;
        if let Some((relation, names)) = &scope.outputs {
            if Arc::ptr_eq(relation, &col.relation) && names.iter().any(|n| n == &col.name) {
                return safe_ident(&col.name);
            }
        }
        let entry = scope.resolve(col)?;
        let name = safe_ident(&col.name)?;
        match (&entry.alias, scope.qualify) {
            (Some(alias), true) => Ok(format!("{}.{}", alias, name)),
            _ => Ok(name),
        }
    }
}
