use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Read;
use tracing::info;

use super::Overrides;
use crate::controller::{Phase, Submission};

/// Where the code to analyze comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    Inline(String),
    File(String),
    Stdin,
}

impl CodeSource {
    pub fn from_args(code: Option<String>, file: Option<String>) -> Result<Self> {
        match (code, file) {
            (Some(_), Some(_)) => bail!("--code and --file are mutually exclusive"),
            (Some(code), None) => Ok(CodeSource::Inline(code)),
            (None, Some(path)) if path == "-" => Ok(CodeSource::Stdin),
            (None, Some(path)) => Ok(CodeSource::File(path)),
            (None, None) => Ok(CodeSource::Stdin),
        }
    }

    pub fn read(self) -> Result<String> {
        match self {
            CodeSource::Inline(code) => Ok(code),
            CodeSource::File(path) => {
                fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))
            }
            CodeSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read code from stdin")?;
                Ok(buf)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub async fn run(
    language: String,
    code: Option<String>,
    file: Option<String>,
    count: Option<usize>,
    output: Option<String>,
    config_path: Option<String>,
    overrides: Overrides,
    dry_run: bool,
) -> Result<()> {
    let config = super::load_config(config_path, &overrides)?;
    let count = count.unwrap_or(config.generation.default_count);
    info!("Dry run: {}", dry_run);

    let source = CodeSource::from_args(code, file)?;
    let code = source.read()?;

    let mut controller = super::build_controller(&config, dry_run)?.with_observer(|phase| match phase {
        Phase::Validating => info!("Validating programming language..."),
        Phase::Generating => info!("Generating test cases..."),
        _ => {}
    });

    let report = controller
        .submit(&Submission {
            language,
            code,
            count,
        })
        .await?;

    let rendered = report.render();
    match output {
        Some(path) => {
            fs::write(&path, &rendered).with_context(|| format!("Failed to write {}", path))?;
            info!("Wrote {} test cases to {}", report.test_cases.len(), path);
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
