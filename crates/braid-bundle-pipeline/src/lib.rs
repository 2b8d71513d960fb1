//! Braid Bundle Pipeline - thread passes into one run
//!
//! A thin sequencer: each step consumes the previous artifact and
//! produces the next. Module-map passes and code passes are distinct
//! artifact types, and feeding the wrong one to a step is a usage
//! error, the only error the core ever raises.

use braid_bundle_core::{Diagnostic, ModuleMap};
use braid_bundle_lex::TokenCache;
use braid_bundle_minify::MinifyOptions;
use braid_bundle_obfuscate::ObfuscateOptions;
use std::fmt;
use thiserror::Error;

/// One pipeline pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Replace unreachable effect-free module bodies with empty source.
    TreeShake,
    /// Flatten the module map into a single code artifact.
    Bundle,
    /// Strip comments and collapse whitespace.
    Minify,
    /// Encode strings and optionally rename identifiers.
    Obfuscate,
}

impl Step {
    fn expects(self) -> &'static str {
        match self {
            Step::TreeShake | Step::Bundle => "a module map",
            Step::Minify | Step::Obfuscate => "code",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::TreeShake => "tree-shake",
            Step::Bundle => "bundle",
            Step::Minify => "minify",
            Step::Obfuscate => "obfuscate",
        })
    }
}

/// Options forwarded to the passes that take any.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Minifier switches.
    pub minify: MinifyOptions,
    /// Obfuscator switches.
    pub obfuscate: ObfuscateOptions,
}

/// What flows between steps.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    /// Module map, before bundling.
    Modules(ModuleMap),
    /// Flattened source text, after bundling.
    Code(String),
}

impl Artifact {
    fn kind(&self) -> &'static str {
        match self {
            Artifact::Modules(_) => "a module map",
            Artifact::Code(_) => "code",
        }
    }

    /// The code artifact, if this is one.
    pub fn as_code(&self) -> Option<&str> {
        match self {
            Artifact::Code(code) => Some(code),
            Artifact::Modules(_) => None,
        }
    }

    /// The module map artifact, if this is one.
    pub fn as_modules(&self) -> Option<&ModuleMap> {
        match self {
            Artifact::Modules(map) => Some(map),
            Artifact::Code(_) => None,
        }
    }
}

/// A pass was handed the wrong artifact type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Step/artifact mismatch; the pipeline stops at the offending step.
    #[error("step `{step}` expects {expected}, found {found}")]
    StageMismatch {
        /// The step that was misfed.
        step: Step,
        /// What the step consumes.
        expected: &'static str,
        /// What it was given.
        found: &'static str,
    },
}

/// A pipeline description: ordered steps, the entry module id, and the
/// per-pass options.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Passes in execution order.
    pub steps: Vec<Step>,
    /// Entry module id, as written in imports.
    pub entry: String,
    /// Per-pass options.
    pub options: PipelineOptions,
}

impl Pipeline {
    /// Pipeline with the given entry and no steps yet.
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            ..Self::default()
        }
    }

    /// Append a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// Final artifact plus every diagnostic the steps produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Output of the last step (the input map when there are no steps).
    pub artifact: Artifact,
    /// Diagnostics in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the pipeline over `modules`. Token streams are shared across
/// steps through one cache, so unchanged module sources are scanned
/// once per run.
pub fn run(pipeline: &Pipeline, modules: ModuleMap) -> Result<PipelineOutput, PipelineError> {
    let mut cache = TokenCache::new();
    let mut artifact = Artifact::Modules(modules);
    let mut diagnostics = Vec::new();

    for &step in &pipeline.steps {
        artifact = match (step, artifact) {
            (Step::TreeShake, Artifact::Modules(map)) => Artifact::Modules(
                braid_bundle_tree_shake::shake_with_cache(&map, &pipeline.entry, &mut cache),
            ),
            (Step::Bundle, Artifact::Modules(map)) => {
                let output =
                    braid_bundle_concat::bundle_with_cache(&map, &pipeline.entry, &mut cache);
                diagnostics.extend(output.diagnostics);
                Artifact::Code(output.code)
            }
            (Step::Minify, Artifact::Code(code)) => Artifact::Code(
                braid_bundle_minify::minify_with_options(&code, &pipeline.options.minify),
            ),
            (Step::Obfuscate, Artifact::Code(code)) => Artifact::Code(
                braid_bundle_obfuscate::obfuscate(&code, &pipeline.options.obfuscate),
            ),
            (step, wrong) => {
                return Err(PipelineError::StageMismatch {
                    step,
                    expected: step.expects(),
                    found: wrong.kind(),
                });
            }
        };
    }

    Ok(PipelineOutput {
        artifact,
        diagnostics,
    })
}
