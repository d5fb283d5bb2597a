use charembed::{
    CharPipeline, EmbeddingConfig, EmbeddingTable, Tokenizer, NO_MATCH, UNKNOWN_TOKEN,
};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const CORPUS: [&str; 3] = [
    "It was the best of times, it was the worst of times.",
    "Call me Ishmael.",
    "Счастливые семьи похожи друг на друга.",
];

#[test]
fn test_end_to_end_pipeline() {
    // Build vocabulary, size the table to it
    let tokenizer = Tokenizer::from_texts(CORPUS);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let table = EmbeddingTable::new(tokenizer.vocab_size(), 24, &mut rng).unwrap();

    let tokens = tokenizer.tokenize("Call me");
    let vectors = table.forward(&tokens);
    assert_eq!(vectors.len(), tokens.len());
    assert!(vectors.iter().all(|v| v.len() == 24));

    // Stand-in for downstream computation: a small rescale keeps direction
    let outputs: Vec<Array1<f32>> = vectors.iter().map(|v| v * 3.5).collect();

    let decoded = table.decode(&outputs);
    assert_eq!(decoded, tokens);
    assert_eq!(tokenizer.decode(&decoded), "C a l l   m e");
}

#[test]
fn test_unknown_character_flows_through() {
    let pipeline =
        CharPipeline::build(CORPUS, &EmbeddingConfig::new(1, 8).with_seed(9)).unwrap();

    let tokens = pipeline.tokenizer().tokenize("Cat#");
    assert_eq!(tokens[3], UNKNOWN_TOKEN);

    let vectors = pipeline.table().forward(&tokens);
    assert!(vectors[3].iter().all(|&v| v == 0.0));

    let recovered = pipeline.recover_tokens(&vectors);
    assert_eq!(recovered[3], NO_MATCH);
    assert_eq!(pipeline.recover(&vectors), "C a t <UNK>");
}

#[test]
fn test_persisted_vocabulary_reproduces_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab.json");

    let config = EmbeddingConfig::new(1, 12).with_seed(77);
    let original = CharPipeline::build(CORPUS, &config).unwrap();
    original.tokenizer().save_vocabulary(&path).unwrap();

    let reloaded =
        CharPipeline::with_tokenizer(Tokenizer::load(&path).unwrap(), &config).unwrap();

    assert_eq!(
        reloaded.tokenizer().tokenize(CORPUS[2]),
        original.tokenizer().tokenize(CORPUS[2])
    );
    assert_eq!(reloaded.table().weights(), original.table().weights());

    let vectors = original.embed("семьи");
    assert_eq!(reloaded.recover(&vectors), "с е м ь и");
}

#[test]
fn test_every_vocabulary_entry_round_trips() {
    let pipeline =
        CharPipeline::build(CORPUS, &EmbeddingConfig::new(1, 32).with_seed(5)).unwrap();
    let tokenizer = pipeline.tokenizer();

    let all: String = tokenizer.vocabulary().chars().collect();
    let tokens = tokenizer.tokenize(&all);
    let vectors = pipeline.embed(&all);

    assert_eq!(pipeline.recover_tokens(&vectors), tokens);
}
