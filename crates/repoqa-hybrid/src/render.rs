use repoqa_core::types::SearchHit;

/// Numbered hand-off text for the answer generator, one hit per line:
/// `"{rank}. {source basename}: {chunk text}"`. Chunk text is passed through
/// untouched.
pub fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| format!("{}. {}: {}", h.rank, h.chunk.meta.basename(), h.chunk.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_question(question: &str) -> String {
    question.split_whitespace().collect::<Vec<_>>().join(" ")
}
