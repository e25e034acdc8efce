use anyhow::{Result, anyhow};
use std::{env, path::Path};

static BASH_SCRIPT: &str = include_str!("../completions/pyed.bash");
static ZSH_SCRIPT: &str = include_str!("../completions/_pyed.zsh");

/// The completion script for the caller's `$SHELL`. Only bash and zsh are
/// supported; both delegate to the hidden `--complete` flag at runtime.
pub fn completion_script() -> Result<&'static str> {
    let shell_path = env::var("SHELL")
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("Must have $SHELL set."))?;
    let shell = Path::new(&shell_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    match shell {
        "bash" => Ok(BASH_SCRIPT),
        "zsh" => Ok(ZSH_SCRIPT),
        _ => Err(anyhow!(
            "\"{shell_path}\" not supported. Only bash and zsh are currently supported."
        )),
    }
}
