//! Domain models shared with rendering collaborators

mod session;

pub use session::{Session, SessionStatus};
