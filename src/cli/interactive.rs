use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::info;

use super::Overrides;
use crate::controller::{Controller, Phase, Submission};
use crate::error::Error;

/// Line that ends the code block in the form
pub const CODE_TERMINATOR: &str = ".";

fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn read_code<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut lines = Vec::new();
    while let Some(line) = read_line(reader)? {
        if line == CODE_TERMINATOR {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Blank means the default; anything else must be a whole number.
fn parse_count(input: &str, default: usize) -> Option<usize> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(default);
    }
    trimmed.parse().ok()
}

/// Run the form loop until EOF or `quit`. Every submission is a fresh cycle;
/// errors are shown and the loop carries on.
pub async fn run_session<R: BufRead, W: Write>(
    controller: &mut Controller,
    default_count: usize,
    reader: &mut R,
    out: &mut W,
) -> Result<usize> {
    let max = controller.max_test_cases();
    let mut completed = 0;

    writeln!(out, "Test Case Generator")?;
    writeln!(
        out,
        "Provide the details below to generate test cases for your code. Type 'quit' to exit."
    )?;

    loop {
        write!(out, "\nProgramming Language (e.g., Python, JavaScript): ")?;
        out.flush()?;
        let Some(language) = read_line(reader)? else {
            break;
        };
        if matches!(language.trim(), "quit" | "exit") {
            break;
        }

        writeln!(
            out,
            "Code (paste your code here, end with a line containing only '{}'):",
            CODE_TERMINATOR
        )?;
        let code = read_code(reader)?;

        write!(
            out,
            "Number of test cases you want (1-{}, default {}): ",
            max, default_count
        )?;
        out.flush()?;
        let count_input = read_line(reader)?.unwrap_or_default();
        let Some(count) = parse_count(&count_input, default_count) else {
            writeln!(
                out,
                "Error: number of test cases must be a whole number between 1 and {}.",
                max
            )?;
            continue;
        };

        let submission = Submission {
            language,
            code,
            count,
        };
        match controller.submit(&submission).await {
            Ok(report) => {
                completed += 1;
                write!(out, "\n{}", report.render())?;
            }
            Err(e) if e.is_input_error() => writeln!(out, "{}", e)?,
            Err(e @ Error::LanguageMismatch { .. }) => writeln!(out, "Error: {}", e)?,
            Err(e) => writeln!(out, "Unexpected error: {}", e)?,
        }
    }

    Ok(completed)
}

pub async fn run(config_path: Option<String>, overrides: Overrides, dry_run: bool) -> Result<()> {
    let config = super::load_config(config_path, &overrides)?;
    let mut controller = super::build_controller(&config, dry_run)?.with_observer(|phase| match phase {
        Phase::Validating => eprintln!("Validating programming language..."),
        Phase::Generating => eprintln!("Generating test cases..."),
        _ => {}
    });

    let stdin = std::io::stdin();
    let mut reader = stdin.lock();
    let mut stdout = std::io::stdout();
    let completed = run_session(
        &mut controller,
        config.generation.default_count,
        &mut reader,
        &mut stdout,
    )
    .await?;
    info!("Session ended after {} completed cycles", completed);
    Ok(())
}
