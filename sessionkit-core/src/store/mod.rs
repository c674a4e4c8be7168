//! Session storage: the page's volatile store and the host's persistent store.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryPersistentStore, MemoryVolatileStore};
pub use traits::{PersistentStore, VolatileStore};

/// Volatile key the hosted application reads its bearer token from.
pub const VOLATILE_TOKEN_KEY: &str = "token";
/// Volatile key holding the serialized user object.
pub const VOLATILE_USER_KEY: &str = "user";
/// Persistent key mirroring [`VOLATILE_TOKEN_KEY`].
pub const PERSISTENT_TOKEN_KEY: &str = "auth_token";
/// Persistent key mirroring [`VOLATILE_USER_KEY`].
pub const PERSISTENT_USER_KEY: &str = "auth_user";
