pub mod heavydb;
pub mod registry;

pub use heavydb::{heavydb_registry, st_point, HeavyDbExprExt};
pub use registry::{Arity, OperatorRegistry, Rendering, Rule};
