pub mod options;
pub mod project;
pub mod resolver;

pub use options::{OptionCategory, OptionSet};
pub use project::{BuildTarget, Project};
pub use resolver::{ResolveError, ResolvedOptions, resolve, resolve_target};
