//! Site configuration loading, section merging, and per-path tool resolution.

pub mod handle;
pub mod paths;
pub mod resolver;
pub mod server;
pub mod source;
pub mod system;
pub mod tree;
pub mod validate;

pub use handle::TreeHandle;
pub use resolver::{ToolPlan, ToolState, match_section, resolve, resolve_global};
pub use server::ServerSettings;
pub use source::{Document, GLOBAL_SECTION, Settings, parse_document};
pub use system::SystemConfig;
pub use tree::{Section, SectionTree};
pub use validate::{Finding, Severity, validate_config, validate_tree};
