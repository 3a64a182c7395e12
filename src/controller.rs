//! Interaction controller: one submit drives one validate-then-generate cycle.
//!
//! ```text
//! Idle -> Validating -> Generating -> Displaying
//!            |              |
//!            +----> Error <-+
//! ```
//!
//! Input errors never leave `Idle`. Nothing is retried; the next submit starts
//! over from `Idle`.

use std::fmt;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::pipeline::generator::{TestCaseBatch, TestCaseGenerator};
use crate::util::capitalize;
use crate::validator::{LanguageValidator, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Generating,
    Displaying,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Validating => "validating",
            Phase::Generating => "generating",
            Phase::Displaying => "displaying",
            Phase::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// What the user filled into the form.
#[derive(Debug, Clone)]
pub struct Submission {
    pub language: String,
    pub code: String,
    pub count: usize,
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone)]
pub struct Report {
    pub declared_language: String,
    pub validation: ValidationResult,
    pub test_cases: TestCaseBatch,
}

impl Report {
    /// Confirmation line plus the cases in a code fence tagged with the
    /// declared language.
    pub fn render(&self) -> String {
        format!(
            "Detected programming language: {}\n\nGenerated Test Cases\n```{}\n{}\n```\n",
            capitalize(&self.validation.detected_language),
            self.declared_language,
            self.test_cases.joined()
        )
    }
}

type PhaseObserver = Box<dyn Fn(Phase) + Send + Sync>;

pub struct Controller {
    validator: LanguageValidator,
    generator: TestCaseGenerator,
    phase: Phase,
    observer: Option<PhaseObserver>,
}

impl Controller {
    pub fn new(validator: LanguageValidator, generator: TestCaseGenerator) -> Self {
        Self {
            validator,
            generator,
            phase: Phase::Idle,
            observer: None,
        }
    }

    /// Called with every phase the controller enters.
    pub fn with_observer(mut self, observer: impl Fn(Phase) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn max_test_cases(&self) -> usize {
        self.generator.max_test_cases()
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        if let Some(ref observer) = self.observer {
            observer(phase);
        }
    }

    /// Field-level checks done before any external call.
    pub fn check(&self, submission: &Submission) -> Result<()> {
        if submission.language.trim().is_empty() {
            return Err(Error::EmptyField("Programming language"));
        }
        if submission.code.trim().is_empty() {
            return Err(Error::EmptyField("Code"));
        }
        self.generator.check_count(submission.count)
    }

    pub async fn submit(&mut self, submission: &Submission) -> Result<Report> {
        self.enter(Phase::Idle);
        if let Err(e) = self.check(submission) {
            warn!("Submission rejected: {}", e);
            return Err(e);
        }

        let language = submission.language.trim();

        self.enter(Phase::Validating);
        let validation = match self.validator.validate(language, &submission.code).await {
            Ok(v) => v,
            Err(e) => return Err(self.fail(e)),
        };

        self.enter(Phase::Generating);
        let test_cases = match self
            .generator
            .generate_test_cases(&validation.detected_language, &submission.code, submission.count)
            .await
        {
            Ok(batch) => batch,
            Err(e) => return Err(self.fail(e)),
        };

        self.enter(Phase::Displaying);
        info!("Cycle complete with {} test cases", test_cases.len());
        Ok(Report {
            declared_language: language.to_string(),
            validation,
            test_cases,
        })
    }

    fn fail(&mut self, e: Error) -> Error {
        warn!("Cycle aborted during {}: {}", self.phase, e);
        self.enter(Phase::Error);
        e
    }
}
