//! Account module
//!
//! Account records, their stores, and the login / registration /
//! revocation flows built on top of them.

mod memory;
mod model;
mod service;
mod store;

pub use memory::MemoryAccountStore;
pub use model::{Account, LoginProfile, NewAccount, Registration};
pub use service::{AccountService, DELETE_DONE};
pub use store::{AccountStore, PgAccountStore};
