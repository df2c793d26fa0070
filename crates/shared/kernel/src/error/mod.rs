mod compose;
mod resolve;

pub use compose::{ComposeError, ComposeErrorExt};
pub use resolve::{ResolveError, ResolveErrorExt};
