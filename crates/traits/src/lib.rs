pub mod document;
pub mod navigation;
pub mod storage;
pub mod transport;

pub use document::DocumentHost;
pub use navigation::NavigationSource;
pub use storage::{InMemorySettingsBackend, SettingsBackend, SettingsMap, StorageError};
pub use transport::{ChannelError, Destination, Transport};
