use super::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::embedding::{
    BackendLoader, EmbeddingBackend, EmbeddingError, MockEmbedder, MockLoader,
};
use crate::lifecycle::BackendStatus;

const MITO_CANDIDATE: &str = "the mitochondria is the powerhouse of the cell";
const MITO_REFERENCE: &str = "mitochondria produces energy for the cell";

fn checker_with(loader: &Arc<MockLoader>) -> AnswerChecker {
    AnswerChecker::new(Arc::clone(loader) as Arc<dyn BackendLoader>)
}

/// cos([1, y], [1, 0]) = 1 / sqrt(1 + y^2)
fn loader_with_pair(candidate: &str, reference: &str, y: f32) -> Arc<MockLoader> {
    let embedder = MockEmbedder::new(2)
        .with_vector(candidate, vec![1.0, y])
        .with_vector(reference, vec![1.0, 0.0]);
    Arc::new(MockLoader::new(embedder))
}

mod exact_tier {
    use super::*;

    #[tokio::test]
    async fn test_identical_answers() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        let verdict = checker.check_answer("cat", "cat", None).await;
        assert_eq!(verdict, Verdict::exact());
        assert!(verdict.is_correct);
        assert_eq!(verdict.similarity, 1.0);
        assert_eq!(verdict.confidence, Confidence::High);
        assert_eq!(verdict.method, MatchMethod::Exact);
    }

    #[tokio::test]
    async fn test_equal_after_normalization_never_touches_backend() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        let pairs = [
            ("The Cat!", "the cat"),
            ("  Newton's   second law ", "newtons second law"),
            ("ATP.", "atp"),
            ("", "   "),
            ("?!", ""),
        ];

        for (a, b) in pairs {
            let verdict = checker.check_answer(a, b, Some(0.99)).await;
            assert_eq!(verdict.method, MatchMethod::Exact, "{:?} vs {:?}", a, b);
            assert!(verdict.is_correct);
            assert_eq!(verdict.similarity, 1.0);
        }

        assert_eq!(loader.load_count(), 0);
        assert_eq!(checker.backend_status(), BackendStatus::Uninitialized);
    }
}

mod string_tier {
    use super::*;

    #[tokio::test]
    async fn test_h2o_vs_water() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        let verdict = checker.check_answer("H2O", "water", None).await;
        assert_eq!(verdict.method, MatchMethod::String);
        assert!(!verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert_eq!(loader.load_count(), 0);
    }

    #[tokio::test]
    async fn test_short_candidate_against_long_reference() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        let verdict = checker.check_answer("mit", "mitochondria", None).await;
        assert_eq!(verdict.method, MatchMethod::String);
        assert!(!verdict.is_correct);
        assert_eq!(loader.load_count(), 0);
    }

    #[tokio::test]
    async fn test_one_typo_in_four_letters_is_not_enough() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        // 3/4 = 0.75: below the 0.8 cutoff.
        let verdict = checker.check_answer("neon", "neom", None).await;
        assert_eq!(verdict.method, MatchMethod::String);
        assert!((verdict.similarity - 0.75).abs() < 1e-6);
        assert!(!verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[test]
    fn test_string_verdict_boundaries() {
        let at_cutoff = Verdict::from_string_similarity(0.8);
        assert!(!at_cutoff.is_correct);
        assert_eq!(at_cutoff.confidence, Confidence::Low);

        let medium = Verdict::from_string_similarity(0.85);
        assert!(medium.is_correct);
        assert_eq!(medium.confidence, Confidence::Medium);

        let at_high = Verdict::from_string_similarity(0.9);
        assert_eq!(at_high.confidence, Confidence::Medium);

        let high = Verdict::from_string_similarity(0.95);
        assert!(high.is_correct);
        assert_eq!(high.confidence, Confidence::High);
    }
}

mod embedding_tier {
    use super::*;

    #[tokio::test]
    async fn test_related_long_answers_are_correct() {
        // cos ~= 0.857
        let loader = loader_with_pair(MITO_CANDIDATE, MITO_REFERENCE, 0.6);
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, Some(0.75))
            .await;

        assert_eq!(verdict.method, MatchMethod::Embedding);
        assert!(verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert!((verdict.similarity - 0.857).abs() < 1e-3);
        assert!(verdict.error.is_none());
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_embeddings_use_normalized_text() {
        let loader = loader_with_pair(MITO_CANDIDATE, MITO_REFERENCE, 0.2);
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer(
                "The MITOCHONDRIA is the powerhouse of the cell!",
                "Mitochondria produces energy, for the cell.",
                None,
            )
            .await;

        assert_eq!(verdict.method, MatchMethod::Embedding);
        assert_eq!(verdict.confidence, Confidence::High);
        assert!(verdict.is_correct);
    }

    #[tokio::test]
    async fn test_threshold_override_rejects() {
        let loader = loader_with_pair(MITO_CANDIDATE, MITO_REFERENCE, 0.6);
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, Some(0.9))
            .await;

        assert_eq!(verdict.method, MatchMethod::Embedding);
        assert!(!verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn test_unrelated_answers_are_incorrect() {
        // cos ~= 0.555
        let loader = loader_with_pair("plate tectonics", "photosynthesis", 1.5);
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer("plate tectonics", "photosynthesis", None)
            .await;

        assert_eq!(verdict.method, MatchMethod::Embedding);
        assert!(!verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn test_negative_cosine_is_clamped() {
        let embedder = MockEmbedder::new(2)
            .with_vector("absolute zero", vec![-1.0, 0.0])
            .with_vector("boiling point", vec![1.0, 0.0]);
        let loader = Arc::new(MockLoader::new(embedder));
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer("absolute zero", "boiling point", None)
            .await;
        assert_eq!(verdict.method, MatchMethod::Embedding);
        assert_eq!(verdict.similarity, 0.0);
        assert!(!verdict.is_correct);
    }

    #[test]
    fn test_similarity_equal_to_threshold_is_correct() {
        let verdict = Verdict::from_embedding_similarity(0.75, 0.75);
        assert!(verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn test_concurrent_checks_load_backend_once() {
        let embedder = MockEmbedder::new(8);
        let loader =
            Arc::new(MockLoader::new(embedder).with_delay(Duration::from_millis(30)));
        let checker = Arc::new(checker_with(&loader));

        let checks = (0..10).map(|i| {
            let checker = Arc::clone(&checker);
            tokio::spawn(async move {
                checker
                    .check_answer(&format!("answer number {i}"), "reference answer", None)
                    .await
            })
        });

        for verdict in join_all(checks).await {
            assert_eq!(verdict.expect("joined").method, MatchMethod::Embedding);
        }
        assert_eq!(loader.load_count(), 1);
    }
}

mod fallback_tier {
    use super::*;

    struct MismatchedBackend;

    #[async_trait]
    impl EmbeddingBackend for MismatchedBackend {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0; text.len()])
        }

        fn embedding_dim(&self) -> usize {
            0
        }

        fn name(&self) -> &str {
            "mismatched"
        }
    }

    struct MismatchedLoader;

    #[async_trait]
    impl BackendLoader for MismatchedLoader {
        async fn load(&self) -> Result<Arc<dyn EmbeddingBackend>, EmbeddingError> {
            Ok(Arc::new(MismatchedBackend))
        }

        fn describe(&self) -> String {
            "mismatched".to_string()
        }
    }

    #[tokio::test]
    async fn test_failed_backend_degrades_to_fallback() {
        let loader = Arc::new(MockLoader::failing(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
            .await;

        assert_eq!(verdict.method, MatchMethod::Fallback);
        assert_eq!(verdict.confidence, Confidence::Low);
        assert!(!verdict.is_correct);
        assert!(verdict.is_degraded());
        let error = verdict.error.expect("fallback carries the error");
        assert!(error.contains("mock load failure"));
    }

    #[tokio::test]
    async fn test_sticky_failure_does_not_reload_per_check() {
        let loader = Arc::new(MockLoader::failing(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        for _ in 0..3 {
            let verdict = checker
                .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
                .await;
            assert_eq!(verdict.method, MatchMethod::Fallback);
        }

        assert_eq!(loader.load_count(), 1);
        let verdict = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
            .await;
        assert!(verdict.error.expect("error").contains("requires explicit reset"));
    }

    #[tokio::test]
    async fn test_fallback_can_still_accept_near_identical_text() {
        let loader = Arc::new(MockLoader::failing(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        let verdict = checker
            .check_answer("photosynthesis process", "photosynthesis proces", None)
            .await;

        assert_eq!(verdict.method, MatchMethod::Fallback);
        assert!(verdict.is_correct);
        assert_eq!(verdict.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn test_embed_error_after_ready_degrades() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);
        assert!(checker.preload_model().await);

        loader.embedder().set_failing(true);
        let verdict = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
            .await;

        assert_eq!(verdict.method, MatchMethod::Fallback);
        assert!(verdict.error.expect("error").contains("mock embedder failure"));
        // Embedding errors do not poison the backend state.
        assert!(checker.is_model_ready());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_degrades() {
        let checker = AnswerChecker::new(Arc::new(MismatchedLoader));

        let verdict = checker
            .check_answer("short answer text", "a much longer reference answer", None)
            .await;

        assert_eq!(verdict.method, MatchMethod::Fallback);
        assert!(verdict.error.expect("error").contains("dimensions differ"));
    }
}

mod lifecycle_facade {
    use super::*;

    #[tokio::test]
    async fn test_preload_reports_success() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        assert!(!checker.is_model_ready());
        assert!(checker.preload_model().await);
        assert!(checker.is_model_ready());
        assert!(checker.preload_model().await);
        assert_eq!(loader.load_count(), 1);
    }

    #[tokio::test]
    async fn test_preload_reports_failure_without_panicking() {
        let loader = Arc::new(MockLoader::failing(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        assert!(!checker.preload_model().await);
        assert!(!checker.is_model_ready());
        assert_eq!(checker.backend_status(), BackendStatus::Failed);
    }

    #[tokio::test]
    async fn test_reset_loading_state_allows_recovery() {
        let loader = loader_with_pair(MITO_CANDIDATE, MITO_REFERENCE, 0.2);
        loader.set_failing(true);
        let checker = checker_with(&loader);

        let degraded = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
            .await;
        assert_eq!(degraded.method, MatchMethod::Fallback);

        loader.set_failing(false);
        checker.reset_loading_state();

        let recovered = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
            .await;
        assert_eq!(recovered.method, MatchMethod::Embedding);
        assert!(recovered.is_correct);
        assert_eq!(loader.load_count(), 2);
    }
}

mod thresholds {
    use super::*;
    use crate::constants::DEFAULT_SEMANTIC_THRESHOLD;

    #[test]
    fn test_resolve_threshold() {
        assert_eq!(resolve_threshold(None, 0.75), 0.75);
        assert_eq!(resolve_threshold(Some(0.6), 0.75), 0.6);
        assert_eq!(resolve_threshold(Some(1.5), 0.75), 1.0);
        assert_eq!(resolve_threshold(Some(-0.2), 0.75), 0.0);
        assert_eq!(resolve_threshold(Some(f32::NAN), 0.75), 0.75);
        assert_eq!(resolve_threshold(Some(f32::INFINITY), 0.75), 0.75);
    }

    #[test]
    fn test_default_threshold_builder() {
        let loader = Arc::new(MockLoader::new(MockEmbedder::new(2)));
        assert_eq!(
            checker_with(&loader).default_threshold(),
            DEFAULT_SEMANTIC_THRESHOLD
        );
        assert_eq!(
            checker_with(&loader).with_default_threshold(0.9).default_threshold(),
            0.9
        );
        assert_eq!(
            checker_with(&loader)
                .with_default_threshold(f32::NAN)
                .default_threshold(),
            DEFAULT_SEMANTIC_THRESHOLD
        );
    }

    #[tokio::test]
    async fn test_default_threshold_applies_when_none() {
        let loader = loader_with_pair(MITO_CANDIDATE, MITO_REFERENCE, 0.6);
        let checker = checker_with(&loader).with_default_threshold(0.9);

        let verdict = checker
            .check_answer(MITO_CANDIDATE, MITO_REFERENCE, None)
            .await;
        assert!(!verdict.is_correct);
    }

    #[test]
    fn test_is_short_text() {
        assert!(is_short_text(""));
        assert!(is_short_text("h2o"));
        assert!(is_short_text("neon"));
        assert!(!is_short_text("argon"));
        // Character count, not bytes.
        assert!(is_short_text("éééé"));
    }
}

mod serialization {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exact_verdict_json_shape() {
        let value = serde_json::to_value(Verdict::exact()).expect("serialize");
        assert_eq!(
            value,
            json!({
                "isCorrect": true,
                "similarity": 1.0,
                "confidence": "high",
                "method": "exact"
            })
        );
    }

    #[test]
    fn test_fallback_verdict_includes_error() {
        let value = serde_json::to_value(Verdict::fallback(0.5, "backend down")).expect("serialize");
        assert_eq!(value["method"], "fallback");
        assert_eq!(value["confidence"], "low");
        assert_eq!(value["isCorrect"], false);
        assert_eq!(value["error"], "backend down");
    }

    #[test]
    fn test_verdict_round_trips_from_camel_case() {
        let verdict: Verdict = serde_json::from_value(json!({
            "isCorrect": false,
            "similarity": 0.4,
            "confidence": "medium",
            "method": "string"
        }))
        .expect("deserialize");

        assert_eq!(verdict.method, MatchMethod::String);
        assert_eq!(verdict.confidence, Confidence::Medium);
        assert!(!verdict.checking);
        assert!(verdict.error.is_none());
    }

    #[test]
    fn test_pending_verdict_serializes_checking() {
        let pending = Verdict::pending();
        assert!(pending.is_pending());
        assert!(!pending.is_correct);
        assert_eq!(pending.to_string(), "CHECKING");

        let value = serde_json::to_value(&pending).expect("serialize");
        assert_eq!(value["checking"], true);
        assert!(value.get("error").is_none());

        let back: Verdict = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, pending);
    }

    #[tokio::test]
    async fn test_finished_verdicts_are_never_pending() {
        let loader = Arc::new(MockLoader::failing(MockEmbedder::new(2)));
        let checker = checker_with(&loader);

        for (a, b) in [("cat", "cat"), ("h2o", "water"), (MITO_CANDIDATE, MITO_REFERENCE)] {
            assert!(!checker.check_answer(a, b, None).await.is_pending());
        }
    }

    #[test]
    fn test_verdict_display() {
        let rendered = Verdict::from_string_similarity(0.95).to_string();
        assert!(rendered.starts_with("CORRECT"));
        assert!(rendered.contains("string"));
    }
}
