mod toolbar;

pub use toolbar::{ToolbarAction, toolbar};
