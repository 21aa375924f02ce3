//! Search Provider Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`NullSearchProvider`] | Testing | Indexes nothing, finds nothing |
//! | [`InMemorySearchProvider`] | Local | Term-frequency index for development |

#[cfg(feature = "search-memory")]
pub mod in_memory;
pub mod null;

#[cfg(feature = "search-memory")]
pub use in_memory::InMemorySearchProvider;
pub use null::NullSearchProvider;
