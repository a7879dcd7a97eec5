//! Shell-sourceable env file writing
//!
//! Later pipeline stages pick up the resolved credentials by sourcing a
//! file of `export KEY=VALUE` lines. Values are single-quoted so URLs and
//! generated passwords survive the shell.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Default env file name.
pub const DEFAULT_ENV_FILE: &str = "setenv_appscan.sh";

/// Append one `export KEY='VALUE'` line to the env file.
pub fn set_env_variable(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    // single quotes in the value close, escape, reopen
    let quoted = value.replace('\'', "'\\''");
    writeln!(file, "export {}='{}'", key, quoted)
}
