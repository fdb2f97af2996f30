use async_trait::async_trait;
use grounded::prelude::*;
use grounded::provider;
use std::sync::Arc;

/// Echoes the number of context passages found in the prompt.
struct CountingGenerator;

#[async_trait]
impl Generator for CountingGenerator {
    async fn generate(&self, prompt: &str) -> provider::Result<Generation> {
        let passages = prompt.matches("deductible is").count();
        Ok(Generation::new(format!(
            "<think>Saw {} deductible passages</think>Check your plan summary.",
            passages
        )))
    }
}

/// Returns canned hits, as a prebuilt vector index would.
struct PrebuiltIndex;

#[async_trait]
impl SimilarityIndex for PrebuiltIndex {
    async fn search(&self, _query: &str, top_k: usize) -> anyhow::Result<Vec<IndexHit>> {
        let hits = vec![
            IndexHit::new("Medical deductible is $500 individual.", 0.82),
            IndexHit::new("Dental deductible is $50 individual.", 0.91),
        ];
        Ok(hits.into_iter().take(top_k).collect())
    }
}

fn corpus() -> Arc<DocumentStore> {
    Arc::new(
        DocumentStore::new(vec![
            Document::new("dental", "Dental deductible is $50 individual."),
            Document::new("medical", "Medical deductible is $500 individual."),
            Document::new("hours", "Support is open weekdays."),
        ])
        .unwrap(),
    )
}

#[tokio::test]
async fn lexical_and_index_strategies_share_the_result_contract() {
    let store = corpus();
    let lexical: Arc<dyn Ranker> = Arc::new(LexicalRanker::new(&store));
    let indexed: Arc<dyn Ranker> = Arc::new(IndexRanker::new(Arc::new(PrebuiltIndex)));

    for ranker in [lexical, indexed] {
        let pipeline = RagPipeline::new(store.clone(), ranker, Arc::new(CountingGenerator))
            .with_top_k(2);

        let result = pipeline.answer("What is my deductible?").await.unwrap();

        assert_eq!(result.reasoning, "Saw 2 deductible passages");
        assert_eq!(result.answer, "Check your plan summary.");
        assert_eq!(result.relevant_documents.len(), 2);
        assert!(result.relevant_documents.iter().all(|d| d.contains("deductible")));
    }
}

#[tokio::test]
async fn index_strategy_orders_by_index_score() {
    let store = corpus();
    let ranker = IndexRanker::new(Arc::new(PrebuiltIndex));

    let ranked = ranker.rank("deductible", &store, 5).await.unwrap();

    assert_eq!(ranked.ids(), vec!["dental", "medical"]);
}
