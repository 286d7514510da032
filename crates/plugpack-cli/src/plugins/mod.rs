// Plugin discovery and module ownership
pub mod context;
pub mod discovery;
pub mod ownership;
pub mod record;

pub use context::{DiscoveredPlugins, PluginContext};
pub use discovery::{DiscoveryEngine, DiscoveryRoot};
pub use ownership::{ascii_lowercase_key, KeyFn, ModuleOwnershipIndex};
pub use record::{PluginRecord, Provenance};
