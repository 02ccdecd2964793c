//! Service Layer - Sessions, dispatch and the session hub

mod dispatch;
pub mod hub;
pub mod session;


pub use hub::{SessionHub, SharedSession};
pub use session::{FullAccount, NotifierSession, MAX_ACCOUNT_LOOKUP};
