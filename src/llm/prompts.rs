// Prompt templates for language detection and test-case generation

pub const DETECT_MARKER: &str =
    "Analyze the following code and identify its programming language:";
const DETECT_SUFFIX: &str =
    "Provide only the name of the programming language in your response.";

pub const GENERATE_MARKER: &str = "Generate as many detailed test cases as possible";

fn with_custom(prompt: String, custom: Option<&str>) -> String {
    match custom.map(str::trim) {
        Some(extra) if !extra.is_empty() => {
            format!("{}\n\nAdditional instructions:\n{}", prompt, extra)
        }
        _ => prompt,
    }
}

pub fn detect_language(code: &str, custom: Option<&str>) -> String {
    with_custom(
        format!("{}\n\n{}\n\n{}", DETECT_MARKER, code, DETECT_SUFFIX),
        custom,
    )
}

pub fn generate_test_cases(language: &str, code: &str, ceiling: usize, custom: Option<&str>) -> String {
    with_custom(
        format!(
            "{} for the following {} code, up to a maximum of {} test cases:\n\n{}\n\n\
             Provide the test cases in a clear and concise format, one test case per line.",
            GENERATE_MARKER, language, ceiling, code
        ),
        custom,
    )
}

/// Recover the code embedded in a detection prompt built by [`detect_language`].
pub fn embedded_code<'a>(prompt: &'a str, marker: &str) -> Option<&'a str> {
    let rest = prompt.strip_prefix(marker)?.strip_prefix("\n\n")?;
    let end = rest.rfind(&format!("\n\n{}", DETECT_SUFFIX))?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_prompt_embeds_code() {
        let prompt = detect_language("print('hi')", None);
        assert!(prompt.starts_with(DETECT_MARKER));
        assert!(prompt.contains("\n\nprint('hi')\n\n"));
        assert!(prompt.ends_with(DETECT_SUFFIX));
    }

    #[test]
    fn test_generate_prompt_uses_ceiling_not_count() {
        let prompt = generate_test_cases("rust", "fn add() {}", 20, None);
        assert!(prompt.contains("following rust code"));
        assert!(prompt.contains("up to a maximum of 20 test cases"));
        assert!(prompt.contains("fn add() {}"));
    }

    #[test]
    fn test_custom_instructions_appended() {
        let prompt = detect_language("x = 1", Some("Answer in lower case."));
        assert!(prompt.ends_with("Additional instructions:\nAnswer in lower case."));

        let unchanged = generate_test_cases("go", "func f() {}", 20, Some("   "));
        assert!(!unchanged.contains("Additional instructions"));
    }

    #[test]
    fn test_embedded_code_roundtrip() {
        let code = "def f():\n\n    return 1";
        let prompt = detect_language(code, Some("extra"));
        assert_eq!(embedded_code(&prompt, DETECT_MARKER), Some(code));
        assert_eq!(embedded_code("unrelated", DETECT_MARKER), None);
    }
}
