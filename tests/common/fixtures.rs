//! Test fixtures for integration tests.

use std::sync::Arc;

use answer_verify::{AnswerChecker, BackendLoader, MockEmbedder, MockLoader};

pub const MITO_CANDIDATE: &str = "The mitochondria is the powerhouse of the cell";

pub const MITO_REFERENCE: &str = "Mitochondria produces energy for the cell";

pub const MOCK_DIM: usize = 3;

/// Builds a mock loader from `(normalized text, vector)` pairs.
#[derive(Default)]
pub struct MockLoaderBuilder {
    vectors: Vec<(String, Vec<f32>)>,
    failing: bool,
}

impl MockLoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector(mut self, normalized_text: &str, vector: Vec<f32>) -> Self {
        self.vectors.push((normalized_text.to_string(), vector));
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn build(self) -> Arc<MockLoader> {
        let embedder = self
            .vectors
            .into_iter()
            .fold(MockEmbedder::new(MOCK_DIM), |embedder, (text, vector)| {
                embedder.with_vector(&text, vector)
            });

        let loader = MockLoader::new(embedder);
        loader.set_failing(self.failing);
        Arc::new(loader)
    }
}

/// Loader where the mitochondria pair scores cos ~= 0.857.
pub fn mitochondria_loader() -> Arc<MockLoader> {
    MockLoaderBuilder::new()
        .vector(
            "the mitochondria is the powerhouse of the cell",
            vec![1.0, 0.6, 0.0],
        )
        .vector("mitochondria produces energy for the cell", vec![1.0, 0.0, 0.0])
        .build()
}

pub fn checker_for(loader: &Arc<MockLoader>) -> AnswerChecker {
    AnswerChecker::new(Arc::clone(loader) as Arc<dyn BackendLoader>)
}
