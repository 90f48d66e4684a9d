mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    find_project, handle_add, handle_delete, handle_history, handle_import, handle_init,
    handle_reorder, handle_reset, handle_save, handle_show, handle_update,
};
