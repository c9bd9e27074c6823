//! Composition of the client/server ProGuard tables with the intermediary tree.
//!
//! The pipeline, with every stage a pure transform over the previous tree:
//!
//! 1. parse the client and server payloads (`named` → `official`)
//! 2. re-root each onto `official`
//! 3. drop synthetic `named` member names from each unless they are retained,
//!    then union them with the client winning conflicts
//! 4. import `intermediary` joined on `official`, reordered before `named`
//! 5. re-root onto `intermediary` (lossy) and emit `intermediary → named`
//!
//! Nothing reaches the sink until every stage has succeeded.

use std::fmt;
use std::io::BufRead;

use tracing::{debug, info};

use crate::error::MappingError;
use crate::filter::{filter_dst_member_names, NameFilter, SYNTHETIC_NAME_PATTERN};
use crate::model::{MappingTree, INTERMEDIARY, NAMED, OFFICIAL};
use crate::proguard;
use crate::source::MappingSource;
use crate::transform::{merge_namespace, merge_trees, reorder_dst, switch_source, SwitchMode};
use crate::visitor::MappingVisitor;

/// Pipeline stage, reported with every composition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening a payload from its provider.
    Source,
    /// Building the synthetic-name filter.
    Filter,
    /// Parsing the client payload.
    ParseClient,
    /// Parsing the server payload.
    ParseServer,
    /// Re-rooting the client tree onto `official`.
    SwitchClient,
    /// Re-rooting the server tree onto `official`.
    SwitchServer,
    /// Unioning client and server trees.
    Merge,
    /// Importing the intermediary namespace.
    Intermediary,
    /// Reordering and re-rooting for emission.
    Reorder,
    /// Feeding the sink.
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Source => "source",
            Stage::Filter => "filter",
            Stage::ParseClient => "parse client mappings",
            Stage::ParseServer => "parse server mappings",
            Stage::SwitchClient => "switch client mappings",
            Stage::SwitchServer => "switch server mappings",
            Stage::Merge => "merge",
            Stage::Intermediary => "intermediary merge",
            Stage::Reorder => "reorder",
            Stage::Emit => "emit",
        })
    }
}

/// A composition failure: the stage that failed and why.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct ComposeError {
    /// Where the pipeline stopped.
    pub stage: Stage,
    /// The underlying error.
    #[source]
    pub source: MappingError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, ComposeError>;
}

impl<T> AtStage<T> for Result<T, MappingError> {
    fn at(self, stage: Stage) -> Result<T, ComposeError> {
        self.map_err(|source| ComposeError { stage, source })
    }
}

/// Composition parameters.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Keep synthetic member names instead of dropping them.
    pub retain_synthetic_names: bool,
    /// Pattern recognising synthetic member names.
    pub synthetic_pattern: String,
    /// Label of the obfuscated namespace.
    pub official: String,
    /// Label of the intermediary namespace.
    pub intermediary: String,
    /// Label of the human-readable namespace.
    pub named: String,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            retain_synthetic_names: false,
            synthetic_pattern: SYNTHETIC_NAME_PATTERN.to_owned(),
            official: OFFICIAL.to_owned(),
            intermediary: INTERMEDIARY.to_owned(),
            named: NAMED.to_owned(),
        }
    }
}

impl ComposeOptions {
    /// Default options with the given synthetic-name policy.
    #[must_use]
    pub fn retaining_synthetic_names(retain: bool) -> Self {
        Self {
            retain_synthetic_names: retain,
            ..Self::default()
        }
    }
}

/// Stages 1–3: the client and server tables as one `official`-rooted tree.
///
/// # Errors
///
/// Returns a [`ComposeError`] naming the parse, switch, merge or filter stage
/// that failed.
pub fn compose_official<C: BufRead, S: BufRead>(
    client: C,
    server: S,
    options: &ComposeOptions,
) -> Result<MappingTree, ComposeError> {
    let (named, official) = (options.named.as_str(), options.official.as_str());
    let filter = NameFilter::new(&options.synthetic_pattern, options.retain_synthetic_names)
        .at(Stage::Filter)?;

    let client = proguard::read(client, named, official).at(Stage::ParseClient)?;
    let server = proguard::read(server, named, official).at(Stage::ParseServer)?;
    debug!(
        client = client.descriptor_count(),
        server = server.descriptor_count(),
        "parsed proguard tables"
    );

    let client = switch_source(&client, official, SwitchMode::Strict).at(Stage::SwitchClient)?;
    let server = switch_source(&server, official, SwitchMode::Strict).at(Stage::SwitchServer)?;
    let client = filter_dst_member_names(&client, &filter);
    let server = filter_dst_member_names(&server, &filter);
    merge_trees(&server, &client).at(Stage::Merge)
}

/// Stages 1–4: the `official`-rooted tree with namespaces
/// `[official, intermediary, named]`.
///
/// # Errors
///
/// Returns a [`ComposeError`] naming the stage that failed.
pub fn compose_with_intermediary<C: BufRead, S: BufRead>(
    client: C,
    server: S,
    intermediary: &MappingTree,
    options: &ComposeOptions,
) -> Result<MappingTree, ComposeError> {
    let official = compose_official(client, server, options)?;
    let merged = merge_namespace(
        &official,
        intermediary,
        &options.official,
        &options.intermediary,
    )
    .at(Stage::Intermediary)?;
    let order = [options.intermediary.as_str(), options.named.as_str()];
    reorder_dst(&merged, &order).at(Stage::Reorder)
}

/// The full pipeline up to, but excluding, emission: an
/// `intermediary → named` tree.
///
/// # Errors
///
/// Returns a [`ComposeError`] naming the stage that failed.
pub fn compose_tree<C: BufRead, S: BufRead>(
    client: C,
    server: S,
    intermediary: &MappingTree,
    options: &ComposeOptions,
) -> Result<MappingTree, ComposeError> {
    let tree = compose_with_intermediary(client, server, intermediary, options)?;
    let rerooted =
        switch_source(&tree, &options.intermediary, SwitchMode::Lossy).at(Stage::Reorder)?;
    let out = reorder_dst(&rerooted, &[options.named.as_str()]).at(Stage::Reorder)?;
    info!(
        classes = out.class_count(),
        members = out.member_count(),
        dropped = tree.descriptor_count().saturating_sub(out.descriptor_count()),
        "composed mappings"
    );
    Ok(out)
}

/// Runs the full pipeline and visits the result with `sink`.
///
/// The sink sees namespaces `intermediary, named` followed by every class and
/// member. It is not called at all if an earlier stage fails.
///
/// # Errors
///
/// Returns a [`ComposeError`] naming the stage that failed, including
/// [`Stage::Emit`] for sink errors.
pub fn compose<C: BufRead, S: BufRead>(
    client: C,
    server: S,
    intermediary: &MappingTree,
    options: &ComposeOptions,
    sink: &mut dyn MappingVisitor,
) -> Result<(), ComposeError> {
    let tree = compose_tree(client, server, intermediary, options)?;
    tree.accept(sink).at(Stage::Emit)
}

/// Mapping layer producing `intermediary → named` names from Mojang's
/// client and server ProGuard tables.
pub struct MojangMappingLayer<'a> {
    client: &'a dyn MappingSource,
    server: &'a dyn MappingSource,
    intermediary: &'a MappingTree,
    options: ComposeOptions,
}

impl<'a> MojangMappingLayer<'a> {
    /// Creates a layer over the given sources.
    #[must_use]
    pub fn new(
        client: &'a dyn MappingSource,
        server: &'a dyn MappingSource,
        intermediary: &'a MappingTree,
        options: ComposeOptions,
    ) -> Self {
        Self {
            client,
            server,
            intermediary,
            options,
        }
    }

    /// The namespace emitted as source.
    #[must_use]
    pub fn source_namespace(&self) -> &str {
        &self.options.intermediary
    }

    /// Opens both sources and runs [`compose`] into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`Stage::Source`] with [`MappingError::SourceUnavailable`] when
    /// a source cannot be opened, or the failure of a later stage.
    pub fn visit(&self, sink: &mut dyn MappingVisitor) -> Result<(), ComposeError> {
        let client = open(self.client)?;
        let server = open(self.server)?;
        compose(client, server, self.intermediary, &self.options, sink)
    }
}

fn open(source: &dyn MappingSource) -> Result<Box<dyn BufRead + '_>, ComposeError> {
    source
        .open()
        .map_err(|e| MappingError::SourceUnavailable {
            source_name: source.name(),
            source: e,
        })
        .at(Stage::Source)
}
