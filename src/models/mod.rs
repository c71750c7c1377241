pub mod list;
pub mod task;

pub use list::{DEFAULT_LIST_ID, ListColor, TaskList};
pub use task::{NewTask, NewTaskRequest, Task, TaskPatch};
