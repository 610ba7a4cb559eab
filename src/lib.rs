//! A small dynamically-typed scripting language: scanner, recursive-descent parser and
//! tree-walking interpreter.
//!
//! ```
//! use tarn::{Interpreter, Value, parse, scan};
//!
//! let program = parse(scan("let a = 2; a * 3;"));
//! assert!(program.is_clean());
//! let values = Interpreter::new().run(&program.statements).unwrap();
//! assert_eq!(values.last(), Some(&Value::Number(6.0)));
//! ```

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod operators;
pub mod output;
pub mod parser;
pub mod printer;
pub mod token;
pub mod value;

pub use ast::{Expr, Program, Stmt};
pub use error::{EnvError, LexError, ParseError, RuntimeError};
pub use interpreter::{BlockErrorPolicy, Interpreter, InterpreterConfig};
pub use lexer::scan;
pub use output::Output;
pub use parser::parse;
pub use token::Token;
pub use value::Value;
