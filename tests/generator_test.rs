// Test-case generation bounds and line handling
mod common;

use casegen::error::Error;
use casegen::pipeline::generator::TestCaseGenerator;
use common::{CannedClient, TEN_CASES};

#[tokio::test]
async fn test_result_never_exceeds_requested_count() {
    let max = 10;
    for n in 1..=max {
        let client = CannedClient::new(&[TEN_CASES]);
        let generator = TestCaseGenerator::new(client, max);
        let batch = generator
            .generate_test_cases("python", "def add(a, b): return a + b", n)
            .await
            .unwrap();
        assert!(batch.len() <= n, "n = {} produced {}", n, batch.len());
        assert_eq!(batch.len(), n);
    }
}

#[tokio::test]
async fn test_short_answer_is_returned_as_is() {
    let client = CannedClient::new(&["1. only case"]);
    let generator = TestCaseGenerator::new(client, 10);
    let batch = generator.generate_test_cases("go", "func f() {}", 5).await.unwrap();
    assert_eq!(batch.as_slice(), &["1. only case".to_string()]);
}

#[tokio::test]
async fn test_count_above_max_rejected_before_any_call() {
    let client = CannedClient::new(&[TEN_CASES]);
    let generator = TestCaseGenerator::new(client.clone(), 10);

    let err = generator
        .generate_test_cases("python", "print('hi')", 25)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::CountOutOfRange {
            requested: 25,
            max: 10
        }
    ));
    assert!(err.is_input_error());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_zero_count_rejected_before_any_call() {
    let client = CannedClient::new(&[TEN_CASES]);
    let generator = TestCaseGenerator::new(client.clone(), 10);
    assert!(generator.generate_test_cases("python", "x", 0).await.is_err());
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_prompt_uses_ceiling_not_requested_count() {
    let client = CannedClient::new(&[TEN_CASES]);
    let generator = TestCaseGenerator::new(client.clone(), 10).with_prompt_ceiling(20);

    generator
        .generate_test_cases("python", "print('hi')", 3)
        .await
        .unwrap();

    let prompt = &client.prompts()[0];
    assert!(prompt.contains("up to a maximum of 20 test cases"));
    assert!(prompt.contains("following python code"));
    assert!(prompt.contains("print('hi')"));
}

#[tokio::test]
async fn test_model_failure_is_generation_failure() {
    let generator = TestCaseGenerator::new(CannedClient::failing("503 Service Unavailable"), 10);
    let err = generator
        .generate_test_cases("python", "print('hi')", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_response_whitespace_trimmed_before_split() {
    let client = CannedClient::new(&["\n\n1. first\n2. second\n\n"]);
    let generator = TestCaseGenerator::new(client, 10);
    let batch = generator.generate_test_cases("c", "int main(){}", 2).await.unwrap();
    assert_eq!(batch.into_vec(), vec!["1. first", "2. second"]);
}
