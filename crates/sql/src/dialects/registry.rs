//! Operator Registry
//!
//! Declarative table mapping each operation kind to the way a dialect spells it.
//! Rules work on already-rendered operand text, so a rule never sees expression trees.

use crate::ir::Op;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type alias for transform function closures.
///
/// Operands arrive fully rendered (and sanitized); closures only splice them together.
pub type TransformFn = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match *self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "{}", k),
            Arity::Range(lo, hi) => write!(f, "{} to {}", lo, hi),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

pub enum Rendering {
    /// `a <sym> b`
    Infix(&'static str),
    /// `<sym>a`
    Prefix(&'static str),
    /// `a<sym>`
    Postfix(&'static str),
    /// `NAME(a, b, ...)`
    Function(&'static str),
    /// Custom splice over rendered operands. `operator_like` marks output that needs
    /// parentheses when nested, and operands that get them too.
    Transform {
        operator_like: bool,
        f: TransformFn,
    },
}

impl Clone for Rendering {
    fn clone(&self) -> Self {
        match self {
            Rendering::Infix(s) => Rendering::Infix(s),
            Rendering::Prefix(s) => Rendering::Prefix(s),
            Rendering::Postfix(s) => Rendering::Postfix(s),
            Rendering::Function(s) => Rendering::Function(s),
            Rendering::Transform { operator_like, f } => Rendering::Transform {
                operator_like: *operator_like,
                f: Arc::clone(f),
            },
        }
    }
}

impl fmt::Debug for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendering::Infix(s) => write!(f, "Infix({:?})", s),
            Rendering::Prefix(s) => write!(f, "Prefix({:?})", s),
            Rendering::Postfix(s) => write!(f, "Postfix({:?})", s),
            Rendering::Function(s) => write!(f, "Function({:?})", s),
            Rendering::Transform { operator_like, .. } => f
                .debug_struct("Transform")
                .field("operator_like", operator_like)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub arity: Arity,
    pub rendering: Rendering,
}

impl Rule {
    /// Whether the rendered form binds looser than a function call.
    pub fn is_operator_like(&self) -> bool {
        match &self.rendering {
            Rendering::Infix(_) | Rendering::Prefix(_) | Rendering::Postfix(_) => true,
            Rendering::Function(_) => false,
            Rendering::Transform { operator_like, .. } => *operator_like,
        }
    }

    pub fn render(&self, args: &[String]) -> String {
        match &self.rendering {
            Rendering::Infix(sym) => args.join(&format!(" {} ", sym)),
            Rendering::Prefix(sym) => format!("{}{}", sym, args.join(", ")),
            Rendering::Postfix(sym) => format!("{}{}", args.join(", "), sym),
            Rendering::Function(name) => format!("{}({})", name, args.join(", ")),
            Rendering::Transform { f, .. } => f(args),
        }
    }
}

/// Registry of operation translations for one dialect.
pub struct OperatorRegistry {
    rules: HashMap<Op, Rule>,
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("rules_count", &self.rules.len())
            .finish()
    }
}

impl Clone for OperatorRegistry {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorRegistry {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    fn insert(mut self, op: Op, arity: Arity, rendering: Rendering) -> Self {
        self.rules.insert(op, Rule { arity, rendering });
        self
    }

    /// Binary operator: `a <sym> b`
    pub fn infix(self, op: Op, sym: &'static str) -> Self {
        self.insert(op, Arity::Exact(2), Rendering::Infix(sym))
    }

    pub fn prefix(self, op: Op, sym: &'static str) -> Self {
        self.insert(op, Arity::Exact(1), Rendering::Prefix(sym))
    }

    pub fn postfix(self, op: Op, sym: &'static str) -> Self {
        self.insert(op, Arity::Exact(1), Rendering::Postfix(sym))
    }

    pub fn function(self, op: Op, name: &'static str, arity: Arity) -> Self {
        self.insert(op, arity, Rendering::Function(name))
    }

    /// Unary function rename: `Op(x)` → `NAME(x)`
    pub fn rename(self, op: Op, name: &'static str) -> Self {
        self.function(op, name, Arity::Exact(1))
    }

    /// Add a custom transform rule whose output reads like a function call
    pub fn transform<F>(self, op: Op, arity: Arity, f: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.insert(
            op,
            arity,
            Rendering::Transform {
                operator_like: false,
                f: Arc::new(f),
            },
        )
    }

    /// Add a custom transform rule whose output reads like an operator expression
    pub fn transform_operands<F>(self, op: Op, arity: Arity, f: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.insert(
            op,
            arity,
            Rendering::Transform {
                operator_like: true,
                f: Arc::new(f),
            },
        )
    }

    pub fn remove(mut self, op: Op) -> Self {
        self.rules.remove(&op);
        self
    }

    pub fn lookup(&self, op: Op) -> Option<&Rule> {
        self.rules.get(&op)
    }

    pub fn has_rule(&self, op: Op) -> bool {
        self.rules.contains_key(&op)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Operand `i`, or `NULL` when the caller passed fewer operands than the rule declares.
pub(crate) fn operand(args: &[String], i: usize) -> &str {
    args.get(i).map(String::as_str).unwrap_or("NULL")
}
