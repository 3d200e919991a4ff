//! Chain execution.
//!
//! One chain is built and executed synchronously per inbound request.
//! The executor holds no per-request state: everything it learns while
//! resolving a stage (like a metadata-derived POI) lives in that stage's
//! validated parameters and dies with the request.
//!
//! Stages apply strictly in request order. Each stage is fully validated
//! before its mutation runs, and the first failure aborts everything
//! after it — mutations from earlier stages stand, matching the
//! stage-by-stage semantics of the wire protocol.

use crate::config::{EngineConfig, UnknownOperationPolicy};
use crate::imaging::backend::{BackendError, ImageResource};
use crate::imaging::params::{ImageSize, Poi};
use crate::metadata::{MetadataError, MetadataStore, poi_from_metadata};
use crate::ops::{
    Operation, PoiLookup, Resolution, ResolveError, TransformationError, resolve,
};
use crate::parser::Chain;
use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error(transparent)]
    Transformation(#[from] TransformationError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("backend failure in '{stage}': {source}")]
    Backend {
        stage: &'static str,
        source: BackendError,
    },
}

impl From<ResolveError> for ExecError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Invalid(e) => ExecError::Transformation(e),
            ResolveError::Metadata(e) => ExecError::Metadata(e),
        }
    }
}

impl ExecError {
    /// Whether the failure should map to an HTTP 400 rather than a 500.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExecError::Transformation(_))
    }
}

/// Identifies the image a chain runs against, for metadata lookup.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub user: &'a str,
    pub image_id: &'a str,
}

/// What a completed chain reports back to the response layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainOutcome {
    /// Whether any smart-size stage actually used a focal point
    /// (explicit or metadata-derived).
    pub pois_used: bool,
    /// Whether the image was mutated at all.
    pub transformed: bool,
}

/// Per-stage focal-point fallback backed by the metadata store.
struct StoredPoiLookup<'a> {
    store: &'a dyn MetadataStore,
    user: &'a str,
    image_id: &'a str,
}

impl PoiLookup for StoredPoiLookup<'_> {
    fn stored_poi(&self) -> Result<Option<Poi>, MetadataError> {
        let metadata = self.store.get_metadata(self.user, self.image_id)?;
        Ok(metadata.as_ref().and_then(poi_from_metadata))
    }
}

/// Applies transformation chains to image resources.
pub struct ChainExecutor<'a> {
    metadata: &'a dyn MetadataStore,
    config: EngineConfig,
}

impl<'a> ChainExecutor<'a> {
    pub fn new(metadata: &'a dyn MetadataStore, config: EngineConfig) -> Self {
        Self { metadata, config }
    }

    /// Resolve every descriptor without touching any pixels, applying
    /// the unknown-name policy. Useful for capability propagation ahead
    /// of fetching/decoding the source.
    pub fn resolve_chain(
        &self,
        chain: &Chain,
        ctx: &RequestContext<'_>,
    ) -> Result<Vec<Operation>, ExecError> {
        let mut ops = Vec::with_capacity(chain.len());
        for desc in chain {
            if let Some(op) = self.resolve_stage(desc, ctx)? {
                ops.push(op);
            }
        }
        Ok(ops)
    }

    /// Apply the chain, stage by stage, to the image.
    pub fn execute(
        &self,
        chain: &Chain,
        ctx: &RequestContext<'_>,
        image: &mut dyn ImageResource,
    ) -> Result<ChainOutcome, ExecError> {
        let mut pois_used = false;

        for desc in chain {
            let Some(op) = self.resolve_stage(desc, ctx)? else {
                continue;
            };

            if let Operation::SmartSize(p) = &op {
                pois_used = pois_used || p.poi_used();
            }

            debug!("applying '{}' to {} image", op.name(), image.size());
            op.transform(image).map_err(|source| ExecError::Backend {
                stage: op.name(),
                source,
            })?;
        }

        Ok(ChainOutcome {
            pois_used,
            transformed: image.has_been_transformed(),
        })
    }

    fn resolve_stage(
        &self,
        desc: &crate::parser::TransformationDescriptor,
        ctx: &RequestContext<'_>,
    ) -> Result<Option<Operation>, ExecError> {
        let lookup = StoredPoiLookup {
            store: self.metadata,
            user: ctx.user,
            image_id: ctx.image_id,
        };

        let op = match resolve(desc, &lookup)? {
            Resolution::Known(op) => op,
            Resolution::Unsupported => match self.config.unknown_operation {
                UnknownOperationPolicy::Skip => {
                    debug!("skipping unsupported transformation '{}'", desc.name);
                    return Ok(None);
                }
                UnknownOperationPolicy::Error => {
                    return Err(TransformationError::Unsupported(desc.name.clone()).into());
                }
            },
        };

        self.check_extent(&op)?;
        Ok(Some(op))
    }

    fn check_extent(&self, op: &Operation) -> Result<(), ExecError> {
        if let Some(cap) = self.config.max_output_dimension
            && let Some(extent) = op.max_requested_extent()
            && extent > cap
        {
            return Err(TransformationError::InvalidParameter(format!(
                "{}: requested extent {extent} exceeds the configured maximum of {cap}",
                op.name()
            ))
            .into());
        }
        Ok(())
    }
}

/// The smallest source the whole chain needs, for upstream stages that
/// would otherwise fetch or decode full-size pixels.
///
/// The first size-constraining stage answers for the chain: stages
/// before it that don't change geometry (flips, compression) are
/// skipped, and a stage with unpredictable geometry (rotation) stops
/// resolution at the full source. The answer never exceeds the source
/// itself.
pub fn chain_minimum_input(ops: &[Operation], source: ImageSize) -> ImageSize {
    for op in ops {
        match op {
            Operation::FlipHorizontally | Operation::FlipVertically | Operation::Compress(_) => {
                continue;
            }
            Operation::Rotate(_) => return source,
            _ => {
                let Some(min) = op.minimum_input_size(source) else {
                    return source;
                };
                return ImageSize::new(
                    min.width.min(source.width),
                    min.height.min(source.height),
                );
            }
        }
    }
    source
}

/// Rescale every stage's positional parameters after an upstream stage
/// substitutes a source `ratio` times smaller than originally requested.
pub fn adjust_chain(ops: &[Operation], ratio: f64) -> Vec<Operation> {
    ops.iter().map(|op| op.adjusted(ratio)).collect()
}
