use thiserror::Error;

/// Errors raised while reading the text forms used for fixtures and dumps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid puyo character {0:?}")]
    InvalidChar(char),
    #[error("field text length {0} is not a multiple of 6")]
    RaggedField(usize),
    #[error("field text has {0} rows but only 14 fit")]
    TooTall(usize),
    #[error("malformed column puyo entry {0:?}")]
    MalformedColumnPuyo(String),
    #[error("column {0} is outside 1..=6")]
    ColumnOutOfRange(usize),
    #[error("column puyo list exceeds {0} entries")]
    ListOverflow(usize),
    #[error("kumipuyo sequence has odd length {0}")]
    OddSequence(usize),
    #[error("{0} cannot be part of a falling piece")]
    NotPieceColor(char),
}
