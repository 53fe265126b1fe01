//! # crucible
//!
//! Generates randomized, memorization-resistant test prompts for evaluating
//! a language model, and derives their ground-truth expected answers from
//! sandbox artifacts. This crate is the substitution core: it turns a
//! template string plus a few contextual identifiers into a fully resolved
//! question and a deterministically derivable expected answer, guaranteeing
//! that randomized values stay consistent everywhere they recur within one
//! generation pass.
//!
//! ## Template language
//!
//! ```text
//! {{entity1}} {{entity2:colors}}          random draws from entity pools
//! {{semantic1:person}} {{semantic2:city}} realistic values by kind
//! {{number1:10:50:currency}}              uniform sample, formatted
//! {{qs_id}} {{artifacts}} TARGET_FILE     sandbox path variables
//! {{file_line:3:{{qs_id}}/data.txt}}      function calls, nestable
//! ```
//!
//! Function calls evaluate innermost-first against text, CSV, SQLite, and
//! YAML/JSON sources; evaluation is pure and never executes arbitrary code.
//!
//! ## Modules
//!
//! - `config` - Explicit resolver configuration, injected at construction
//! - `error` - Structured error types for every resolution failure mode
//! - `functions` - The registered function library over sandbox sources
//! - `template` - Binding session, placeholder resolvers, and the
//!   function-evaluation engine

pub mod config;
pub mod error;
pub mod functions;
pub mod template;

pub use config::ResolverConfig;
pub use error::{ResolveError, ResolveResult};
pub use functions::FunctionRegistry;
pub use template::{
    BindingSession, EntityPools, EntryContext, ResolvedTemplate, TemplateResolver,
};
