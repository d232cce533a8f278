//! file: core/src/lib.rs
//! description: compiler middle end for the syc source language.
//!
//! The crate turns source text into a typed, basic-block IR module in three
//! stages: the parser builds the AST and populates the symbol table, the
//! runtime registrar seeds the table with the external library catalog, and
//! the lowerer translates the AST into IR. A `Session` owns the shared
//! state; `generate_ir` is the one-shot entry point over a byte stream.
//!
pub mod ast;
pub mod error;
pub mod ir;
pub mod parser;
pub mod runtime;
pub mod symtab;

pub use ast::AstNode;
pub use error::CompileError;
pub use ir::Module;
pub use symtab::SymbolTable;

/// One compilation: the symbol registry and the parsed tree. Sessions are
/// not reentrant; make a new one per source unit.
pub struct Session {
    pub symbols: SymbolTable,
    ast: Option<AstNode>,
}

impl Session {
    /// Fresh session with the runtime library pre-registered.
    pub fn new() -> Result<Self, CompileError> {
        let mut symbols = SymbolTable::new();
        runtime::install(&mut symbols)?;
        Ok(Session { symbols, ast: None })
    }

    /// Parse and resolve a source unit. On success the AST is retained for
    /// lowering and inspection.
    pub fn parse(&mut self, source: &str) -> Result<&AstNode, CompileError> {
        let root = parser::parse_source(source, &mut self.symbols)?;
        Ok(self.ast.insert(root))
    }

    pub fn ast(&self) -> Option<&AstNode> {
        self.ast.as_ref()
    }

    /// Lower the parsed tree into an IR module. Yields an empty module when
    /// nothing was parsed.
    pub fn lower(&mut self, module_name: &str) -> Module {
        match &self.ast {
            Some(root) => ir::lower::Lowerer::new(&mut self.symbols, module_name).run(root),
            None => Module::new(module_name),
        }
    }
}

/// Compile a source string into an IR module. The first syntax or semantic
/// error aborts with no IR produced.
pub fn compile(source: &str, module_name: &str) -> Result<Module, CompileError> {
    let mut session = Session::new()?;
    session.parse(source)?;
    Ok(session.lower(module_name))
}

/// Read a whole byte stream and compile it. This is the invocation contract
/// used by the driver: parse failure surfaces as an error and no IR is
/// produced.
pub fn generate_ir<R: std::io::Read>(
    input: &mut R,
    module_name: &str,
) -> Result<Module, CompileError> {
    let mut source = String::new();
    input.read_to_string(&mut source)?;
    compile(&source, module_name)
}
