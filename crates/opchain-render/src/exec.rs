//! Blocking subprocess execution.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{RenderError, Result};

/// Output of a successful external tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code (always 0)
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

/// Runs `program` with `args` and waits for it.
///
/// `env` is added to the child's environment only. A non-zero exit is
/// returned as [`RenderError::RenderFailed`] with the captured output.
pub(crate) fn run(
    program: &str,
    args: &[String],
    env: &BTreeMap<String, String>,
    working_dir: Option<&Path>,
) -> Result<ExecutionResult> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    info!(cmd = %command_line(program, args), "spawning");
    let output = cmd.output().map_err(|source| RenderError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    debug!(status = %output.status, stdout_len = stdout.len(), stderr_len = stderr.len(), "process exited");

    if output.status.success() {
        Ok(ExecutionResult {
            exit_code: 0,
            stdout,
            stderr,
        })
    } else {
        Err(RenderError::RenderFailed {
            code: output.status.code(),
            stdout,
            stderr,
        })
    }
}

/// Joins a program and its arguments into one copy-pasteable line.
///
/// Arguments with whitespace or quotes are wrapped in single quotes.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(quote)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quoting() {
        let args = vec!["--iscolorspace".to_string(), "ACES - ACEScg".into(), "".into()];
        assert_eq!(
            command_line("oiiotool", &args),
            "oiiotool --iscolorspace 'ACES - ACEScg' ''"
        );
    }

    #[test]
    fn test_spawn_error() {
        let err = run(
            "opchain-definitely-not-a-program",
            &[],
            &BTreeMap::new(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
        assert!(!err.is_render_failure());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_stub() {
        let args = vec!["-c".to_string(), "echo boom >&2; exit 3".into()];
        let err = run("sh", &args, &BTreeMap::new(), None).unwrap_err();
        match err {
            RenderError::RenderFailed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_env_and_stdout() {
        let mut env = BTreeMap::new();
        env.insert("OPCHAIN_PROBE".to_string(), "ok".to_string());
        let args = vec!["-c".to_string(), "printf %s \"$OPCHAIN_PROBE\"".into()];
        let res = run("sh", &args, &env, None).unwrap();
        assert_eq!(res.exit_code, 0);
        assert_eq!(res.stdout, "ok");
    }
}
