use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid label key {0:?}")]
    InvalidKey(String),
    #[error("invalid label value {0:?}")]
    InvalidValue(String),
    #[error("unknown set operator {0:?}, expected `in` or `notin`")]
    UnknownOperator(String),
    #[error("unbalanced parentheses in {0:?}")]
    UnbalancedParentheses(String),
    #[error("empty value set in {0:?}")]
    EmptyValueSet(String),
    #[error("empty requirement in selector {0:?}")]
    EmptyRequirement(String),
}
