//! In-memory entity store for projects, the current plan and server
//! configuration.
//!
//! This module provides:
//! - [`Store`]: the commit-capable owner, handed to the dispatcher
//! - [`StoreView`]: a read-only projection that views subscribe to
//! - Atomic commits: readers never see a half-applied change
//! - Identity lookups by guid through an index kept alongside the list
//!
//! Nothing is persisted and nothing is evicted; the store lives as long as
//! the application does.

mod handle;
mod state;
mod view;

pub use handle::Store;
pub use state::StoreState;
pub use view::StoreView;
