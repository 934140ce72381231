use std::{
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use lazyfield_core::result::execution_result_to_json;
use serde_json::Value as Json;

use crate::execute::{execute, Mode};

#[derive(clap::Parser, Debug)]
pub(crate) struct Args {
    /// JSON file containing the field plan, or `-` for stdin
    pub(crate) plan: PathBuf,

    /// Force each top-level field separately, so that one failing field
    /// does not discard the data of the others
    #[arg(long, default_value_t = false)]
    pub(crate) isolate_fields: bool,

    /// Pretty-print the result
    #[arg(long, default_value_t = false)]
    pub(crate) pretty: bool,
}

/// Run the `resolve` command.
pub(crate) fn resolve(args: &Args) -> Result<()> {
    let document = read_plan(&args.plan)?;
    let mode = if args.isolate_fields {
        Mode::IsolateFields
    } else {
        Mode::Whole
    };
    let result = execute(document, mode)?;
    if result.has_errors() {
        tracing::info!(errors = result.errors.len(), "resolved with errors");
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        execution_result_to_json(&result)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output)?;
    Ok(())
}

pub(crate) fn read_plan(path: &Path) -> Result<Json> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading plan from stdin")?;
        text
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading plan from {}", path.display()))?
    };
    serde_json::from_str(&text).with_context(|| format!("parsing plan {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, r#"{"a": {"$defer": 1}}"#).unwrap();
        assert_eq!(read_plan(&path).unwrap(), json!({"a": {"$defer": 1}}));
    }

    #[test]
    fn test_read_plan_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_plan(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"), "{}", err);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        let err = read_plan(&broken).unwrap_err();
        assert!(err.to_string().contains("parsing plan"), "{}", err);
    }

    #[test]
    fn test_resolve_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, r#"{"ok": 1, "bad": {"$error": "nope"}}"#).unwrap();
        let args = Args {
            plan: path,
            isolate_fields: true,
            pretty: false,
        };
        resolve(&args).unwrap();
    }
}
