//! Expiring session store: key normalization, TTL policy, typed access and backends.

mod backend;
mod error;
mod http;
mod key;
mod memory;
mod session;
mod ttl;

pub use backend::KeyValueStore;
pub use error::{StoreError, StoreErrorKind};
pub use http::{ABSOLUTE_TTL_PARAM, HttpStore, SLIDING_TTL_PARAM};
pub use key::{MAX_KEY_CHARS, StoreKey, build_key, normalize_key, normalize_segment};
pub use memory::MemoryStore;
pub use session::SessionStore;
pub use ttl::{EntryOptions, Ttl, TtlDefaults};
