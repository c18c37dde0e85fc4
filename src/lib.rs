//! Client-side state for the tfwatch dashboard.
//!
//! Data flows one way:
//!
//! ```text
//! view -> Dispatcher (named action) -> ResourceClient (HTTP)
//!                    -> Store commit -> StoreView subscribers re-render
//! ```

pub mod config;
pub mod dispatch;
pub mod relative_time;
pub mod remote;
pub mod store;

#[cfg(test)]
mod testing;

pub use dispatch::{Action, ActionError, ActionEvent, Dispatched, Dispatcher, Outcome};
pub use remote::{HttpResourceClient, ResourceClient};
pub use store::{Store, StoreView};
