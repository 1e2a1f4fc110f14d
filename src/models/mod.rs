pub mod project;
pub mod task;
pub mod user;

pub use project::{CreateProjectInput, Project, ProjectResponse, UpdateProjectInput};
pub use task::{
    CreateTaskInput, Task, TaskPriority, TaskResponse, TaskStatistics, TaskStatus,
    UpdateTaskInput, UpdateTaskStatusInput,
};
pub use user::{CreateUserInput, UpdateUserInput, User, UserResponse, UserRole};
