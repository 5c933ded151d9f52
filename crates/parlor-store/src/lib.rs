//! Session storage for Parlor.
//!
//! Everything durable lives behind the [`SessionStore`] trait: a global
//! registry of session codes plus, per session, one `status` document and
//! a `players` collection. The trait is deliberately a dumb key/collection
//! store — domain rules (capacity, name uniqueness, join eligibility) live
//! in `parlor-session`, which composes store calls under the per-session
//! critical section that [`SessionStore::guard`] hands out.
//!
//! The bundled backend is [`MemoryStore`]: session state is best-effort
//! and ephemeral by design, so an in-process map is a legitimate
//! deployment, not just a test double. A networked document store slots in
//! by implementing the same trait.

mod doc;
mod error;
mod memory;
mod store;

pub use doc::{PlayerDoc, StatusDoc};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::SessionStore;
