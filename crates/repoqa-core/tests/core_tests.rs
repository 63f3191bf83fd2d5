use figment::Jail;

use repoqa_core::config::{resolve_path, Config, RetrievalConfig};
use repoqa_core::{Chunker, ChunkingConfig, Document, SourceMeta};

fn doc(text: &str) -> Document {
    Document::new("file-1", text, SourceMeta::new("src/lib.rs", "file-1"))
}

fn prose(paragraphs: usize, sentences: usize) -> String {
    (0..paragraphs)
        .map(|p| {
            (0..sentences)
                .map(|s| format!("Sentence {s} of paragraph {p} talks about parsing and indexing."))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[test]
fn empty_document_yields_no_chunks() {
    let chunks = Chunker::default().chunk(&doc(""));
    assert!(chunks.is_empty());
}

#[test]
fn short_document_is_a_single_chunk_equal_to_the_text() {
    let text = "fn main() {\n    println!(\"hi\");\n}\n";
    let chunks = Chunker::default().chunk(&doc(text));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
    assert_eq!((chunks[0].start, chunks[0].end), (0, text.chars().count()));
}

#[test]
fn windows_cover_the_text_and_overlap_exactly() {
    let text = prose(40, 12);
    let len = text.chars().count();
    let (chunk_size, overlap) = (700, 60);
    let chunker = Chunker::new(ChunkingConfig { chunk_size, overlap }).expect("config");
    let chunks = chunker.chunk(&doc(&text));

    assert!(chunks.len() > 3, "expected several chunks, got {}", chunks.len());
    assert_eq!(chunks.first().map(|c| c.start), Some(0));
    assert_eq!(chunks.last().map(|c| c.end), Some(len));
    for c in &chunks {
        assert!(c.char_len() <= chunk_size);
        let expected: String = text.chars().skip(c.start).take(c.char_len()).collect();
        assert_eq!(c.text, expected, "chunk text must be the exact source slice");
    }
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].end - pair[1].start, overlap, "adjacent chunks share exactly `overlap` chars");
        assert!(pair[1].end > pair[0].end, "windows move forward");
    }
}

#[test]
fn cuts_prefer_paragraph_boundaries() {
    // paragraphs are shorter than the lookback window, so one is always in reach
    let text = prose(60, 3);
    let chunker = Chunker::new(ChunkingConfig { chunk_size: 1200, overlap: 100 }).expect("config");
    let chunks = chunker.chunk(&doc(&text));
    for c in &chunks[..chunks.len() - 1] {
        assert!(c.text.ends_with("\n\n"), "chunk {} should end on a paragraph break", c.ordinal);
    }
}

#[test]
fn chunks_copy_metadata_and_keep_corpus_order() {
    let a = Document::new("a", prose(10, 12), SourceMeta::new("docs/a.md", "a"));
    let b = Document::new("b", "tiny", SourceMeta::new("b.txt", "b"));
    let empty = Document::new("c", "", SourceMeta::new("c.txt", "c"));
    let chunker = Chunker::new(ChunkingConfig { chunk_size: 500, overlap: 50 }).expect("config");
    let chunks = chunker.chunk_documents(&[a.clone(), empty, b.clone()]);

    let last = chunks.last().expect("chunks");
    assert_eq!(last.meta, b.meta);
    assert_eq!(last.text, "tiny");
    assert!(chunks[..chunks.len() - 1].iter().all(|c| c.meta == a.meta && c.doc_id == "a"));
    let ordinals: Vec<usize> = chunks.iter().filter(|c| c.doc_id == "a").map(|c| c.ordinal).collect();
    assert_eq!(ordinals, (0..ordinals.len()).collect::<Vec<_>>());
}

#[test]
fn retrieval_defaults_match_documented_values() {
    let cfg = RetrievalConfig::default();
    assert_eq!(cfg.chunking.chunk_size, 3000);
    assert_eq!(cfg.chunking.overlap, 200);
    assert_eq!(cfg.bm25.k1, 1.5);
    assert_eq!(cfg.bm25.b, 0.75);
    assert_eq!(cfg.fusion.bm25_weight, 0.5);
    assert_eq!(cfg.fusion.cosine_weight, 0.5);
    assert_eq!(cfg.top_k, 5);
    assert!(!cfg.tfidf.cache_fit);
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_merges_toml_env_file_and_env_vars() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [retrieval]
            top_k = 3
            [retrieval.chunking]
            chunk_size = 1000
            "#,
        )?;
        jail.create_file("config.test.toml", "[retrieval.bm25]\nk1 = 1.2\n")?;
        jail.set_env("REPOQA_RETRIEVAL__TOP_K", "8");

        let config = Config::load_for_env(Some("test")).map_err(|e| e.to_string())?;
        let retrieval = config.retrieval().map_err(|e| e.to_string())?;
        assert_eq!(retrieval.top_k, 8);
        assert_eq!(retrieval.chunking.chunk_size, 1000);
        assert_eq!(retrieval.chunking.overlap, 200);
        assert_eq!(retrieval.bm25.k1, 1.2);
        assert_eq!(retrieval.bm25.b, 0.75);
        Ok(())
    });
}

#[test]
fn missing_retrieval_section_falls_back_to_defaults() {
    Jail::expect_with(|_jail| {
        let config = Config::load_for_env(Some("dev")).map_err(|e| e.to_string())?;
        assert_eq!(config.retrieval().map_err(|e| e.to_string())?, RetrievalConfig::default());
        Ok(())
    });
}

#[test]
fn invalid_overlap_is_rejected_at_load() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[retrieval.chunking]\nchunk_size = 100\noverlap = 100\n")?;
        assert!(Config::load_for_env(Some("dev")).is_err());
        Ok(())
    });
}

#[test]
fn paths_expand_variables_and_anchor_relative_input() {
    Jail::expect_with(|jail| {
        jail.set_env("REPOQA_TEST_REPO", "/srv/checkouts");
        let base = std::path::Path::new("/work");
        assert_eq!(resolve_path(base, "$REPOQA_TEST_REPO/app"), std::path::PathBuf::from("/srv/checkouts/app"));
        assert_eq!(resolve_path(base, "repo/src"), std::path::PathBuf::from("/work/repo/src"));
        assert_eq!(resolve_path(base, "$REPOQA_UNSET_VAR"), std::path::PathBuf::from("/work/$REPOQA_UNSET_VAR"));
        Ok(())
    });
}
