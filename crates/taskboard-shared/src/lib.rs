//! Types shared by the taskboard server and client: the wire models, request
//! bodies and their validation, and the route table.

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::ValidationError;
pub use protocol::{ErrorBody, NewTask, NewUser, RenameUser, TaskPatch};
pub use types::{Task, User};
