pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod function;
pub mod hashing;
pub mod interpreter;
pub mod natives;
pub mod parser;
pub mod scanner;
pub mod scope;
pub mod token;
pub mod value;
