use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StringsError {
    #[error("string pool index {0} is out of range")]
    InvalidPoolIndex(u32),

    #[error("byte index {0} does not fall on a character boundary")]
    NotACharBoundary(usize),
}

pub type StringsResult<T> = Result<T, StringsError>;
