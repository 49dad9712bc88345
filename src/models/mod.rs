pub mod account;
pub mod todo;

pub use account::{Account, RegisterAccountRequest, RegisterAccountResponse};
pub use todo::{
    DueDateFilter, NewTodo, NewTodoRequest, ProgressStatus, RecurrenceType, StatusFilter, Todo,
    TodoFilter, UpdateTodoRequest,
};
