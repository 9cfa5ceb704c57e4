pub mod acquire;
pub mod renew;
pub mod session;

pub use session::{Credential, Session};
