pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskStatus, TaskView};
pub use user::{PublicUser, Role, User};
