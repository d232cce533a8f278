use std::fmt;

/// Errors surfaced while compiling a source unit.
///
/// Compilation stops at the first error: syntax and symbol errors come out
/// of the parser, redeclarations out of the symbol table. The lowerer never
/// produces errors of its own; it degrades locally on malformed input.
#[derive(Debug)]
pub enum CompileError {
    /// The source text did not match the grammar.
    Syntax { line: usize, message: String },
    /// A name was defined twice in the same scope.
    Redeclaration { line: usize, name: String },
    /// An identifier was used without a visible definition.
    Undefined { line: usize, name: String },
    /// Reading the source stream failed.
    Io(std::io::Error),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax { line, message } => {
                write!(f, "Error at line {}: {}", line, message)
            }
            CompileError::Redeclaration { line, name } => {
                write!(f, "Error at line {}: Redeclaration of symbol '{}'", line, name)
            }
            CompileError::Undefined { line, name } => {
                write!(f, "Error at line {}: Undefined symbol '{}'", line, name)
            }
            CompileError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        CompileError::Io(err)
    }
}
