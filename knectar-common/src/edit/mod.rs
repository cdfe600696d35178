//! Edit mode: the gate that unlocks content-editing affordances
//!
//! # Known weak point
//!
//! The gate compares a username and an unsalted, un-iterated SHA-256 digest
//! of the password against configured values, then keeps a session record in
//! client-side storage. Anyone able to write that storage is "logged in".
//! It only decides whether editing controls are *shown*. Writes to the menu
//! document are authorized separately by the backend's shared edit secret.

mod editor;
mod session;
mod storage;

pub use editor::PageEditor;
pub use session::{
    password_digest, Credentials, EditGate, EditMode, LoginError, Session, SESSION_TTL_MS,
};
pub use storage::{MemoryStorage, SessionStorage, DRAFT_KEY, SESSION_KEY};
