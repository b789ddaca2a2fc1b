//! One file per grammar production, the way the teacher's
//! `parser::grammar` module is laid out — `body` (the shared
//! text/action loop), then each control construct, then the leaf
//! `pipeline` grammar every construct's `pipe` field bottoms out in.

pub(crate) mod body;
pub(crate) mod define;
pub(crate) mod for_stmt;
pub(crate) mod if_stmt;
pub(crate) mod pipeline;
pub(crate) mod template_call;
pub(crate) mod with_stmt;
