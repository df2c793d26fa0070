use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

/// Discriminant of a feature bundle.
///
/// Implemented by a fieldless enum enumerating every supported kind. `Ord` follows the
/// declaration order and makes conflict reports deterministic; `FromStr`/`Display` map kinds to
/// the names used in configuration files.
pub trait FeatureKind:
    Copy + Eq + Ord + Hash + Debug + Display + FromStr + Send + Sync + 'static
{
    /// Whether at most one feature of this kind may be composed into a scope.
    fn is_exclusive(self) -> bool;
}
