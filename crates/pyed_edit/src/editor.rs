use anyhow::{Context, Result};
use log::{debug, trace};
use std::{
    env,
    path::{Path, PathBuf},
    process::Command,
};

/// Editors that accept a `+<lineno>` argument. For anything else the line
/// number is silently dropped.
pub const SUPPORTS_LINENO: &[&str] = &["vim", "gvim", "vi", "nvim", "mvim", "emacs", "jed", "nano"];

/// Environment variables consulted for the editor, in priority order.
const EDITOR_ENV: &[&str] = &["PYED_EDITOR", "VISUAL", "EDITOR"];

/// Pick the editor to launch: environment overrides, then a platform
/// default, then whichever common editor is actually installed.
pub fn get_editor() -> String {
    for key in EDITOR_ENV {
        if let Ok(value) = env::var(key)
            && !value.is_empty()
        {
            trace!("Using editor from ${}: {}", key, value);
            return value;
        }
    }
    if cfg!(windows) {
        return "notepad".to_string();
    }
    for editor in ["vim", "nano"] {
        if find_in_path(editor).is_some() {
            return editor.to_string();
        }
    }
    "vi".to_string()
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Build the shell command that opens `filename`, jumping to `lineno` when
/// the editor is known to support it.
pub fn editor_command(filename: &Path, lineno: Option<usize>, editor: Option<&str>) -> String {
    let mut editor = match editor {
        Some(editor) => editor.to_string(),
        None => get_editor(),
    };
    // Enclose in quotes if necessary and legal
    if editor.contains(' ') && Path::new(&editor).is_file() && !editor.starts_with('"') {
        editor = format!("\"{editor}\"");
    }
    let program = editor.split_whitespace().next().unwrap_or("");
    match lineno {
        Some(lineno) if SUPPORTS_LINENO.contains(&program) => {
            format!("{} +{} \"{}\"", editor, lineno, filename.display())
        }
        _ => format!("{} \"{}\"", editor, filename.display()),
    }
}

/// Launch the editor and block until it exits. Returns the editor's exit
/// code; a launch failure is an error, a non-zero exit is not.
pub fn edit_file(filename: &Path, lineno: Option<usize>, editor: Option<&str>) -> Result<i32> {
    let command = editor_command(filename, lineno, editor);
    debug!("Launching editor: {}", command);
    let status = shell(&command)
        .status()
        .with_context(|| format!("Failed to launch editor: {command}"))?;
    // killed by signal counts as failure
    Ok(status.code().unwrap_or(1))
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}
