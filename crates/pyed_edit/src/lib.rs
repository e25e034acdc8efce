//! Editor launching for pyed.
//!
//! Selects an editor from the environment, assembles the command line
//! (including a jump-to-line flag for editors known to support it), spawns
//! it through the shell, and surfaces the exit code. Also carries the
//! embedded shell-completion scripts.

mod completion;
mod editor;

// Re-export public API
pub use completion::completion_script;
pub use editor::{SUPPORTS_LINENO, edit_file, editor_command, get_editor};
