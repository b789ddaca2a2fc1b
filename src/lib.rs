#![doc = include_str!("../README.md")]

mod builtins;
mod error;
mod exec;
mod funcs;
mod group;
mod lexer;
mod limit;
mod parse;
mod sink;
mod template;
mod value;

pub use crate::error::Error;
pub use crate::funcs::{Arity, FuncDescriptor, FuncMap};
pub use crate::lexer::{Lexer, Token, TokenKind};
pub use crate::limit::DepthTracker;
pub use crate::parse::{Node, Tree};
pub use crate::sink::{IoSink, Sink};
pub use crate::template::Template;
pub use crate::value::{Kind, Value, ValueAdapter};
