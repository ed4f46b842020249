use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Syntax Error: {0}")]
    Syntax(#[from] Box<pest::error::Error<crate::parser::Rule>>),

    #[error("{span}: {message}")]
    Semantic { span: crate::ast::SourceSpan, message: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<pest::error::Error<crate::parser::Rule>> for CompilerError {
    fn from(err: pest::error::Error<crate::parser::Rule>) -> Self {
        CompilerError::Syntax(Box::new(err))
    }
}
