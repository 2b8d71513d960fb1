//! Braid JavaScript Bundler
//!
//! One shared tokenizer, a handful of token-stream passes, and a thin
//! sequencer. Everything here is a pure function over in-memory data:
//! same module map in, same artifact out.

pub use braid_bundle_concat as concat;
pub use braid_bundle_core as core;
pub use braid_bundle_graph as graph;
pub use braid_bundle_lex as lex;
pub use braid_bundle_minify as minify;
pub use braid_bundle_module as module_syntax;
pub use braid_bundle_obfuscate as obfuscate;
pub use braid_bundle_pipeline as pipeline;
pub use braid_bundle_tree_shake as tree_shake;

/// Version of the Braid bundler.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
