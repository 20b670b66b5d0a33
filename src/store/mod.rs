pub mod inbox;
pub mod project_store;
pub mod task_store;

pub use inbox::Inbox;
pub use project_store::ProjectStore;
pub use task_store::TaskStore;
