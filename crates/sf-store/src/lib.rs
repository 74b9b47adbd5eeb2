//! # sf-store
//!
//! The entity store side of the synchronization protocol: four named
//! collections persisted as whole JSON documents, replaced in their entirety
//! on every write, plus the backup/restore surface.
//!
//! Three implementations of the [`EntityStore`] contract:
//! - [`FileStore`] — flat JSON documents in a data directory (the server's
//!   store)
//! - [`MemoryStore`] — in-memory collections with an offline toggle, for
//!   tests and cache-only operation
//! - [`RemoteStore`] — HTTP client against a remote sf-server instance

pub mod backup;
pub mod collection;
pub mod file;
pub mod memory;
pub mod remote;
pub mod store;

pub use backup::*;
pub use collection::*;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use store::*;
