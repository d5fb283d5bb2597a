pub mod embedding;
pub mod kernels;
pub mod pipeline;
pub mod tensor;
pub mod tokenizer;

pub use embedding::{
    EmbeddingConfig, EmbeddingError, EmbeddingTable, Match, DEFAULT_INIT_SCALE, NO_MATCH,
};
pub use pipeline::CharPipeline;
pub use tensor::{Tensor1, Tensor2};
pub use tokenizer::{TokenId, Tokenizer, TokenizerError, Vocabulary, UNKNOWN_PIECE, UNKNOWN_TOKEN};
