//! # imgchain
//!
//! Transformation-chain resolution and crop geometry for image servers.
//! A client sends an ordered list of compact transformation tokens; this
//! crate parses them, validates each operation, computes deterministic
//! pixel geometry — most notably a focal-point-aware ("smart") crop —
//! and applies the resulting pipeline to an image resource.
//!
//! # Architecture: Resolve, Query, Apply
//!
//! A request flows through three independent layers:
//!
//! ```text
//! 1. Parse     raw tokens      →  Chain            (never fails)
//! 2. Resolve   Chain           →  Vec<Operation>   (per-op validation)
//! 3. Execute   Vec<Operation>  →  mutated image    (backend delegation)
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Fail-fast validation**: a stage is fully validated before any of
//!   its pixels move; a bad parameter aborts cleanly with a client error.
//! - **Constraint propagation**: resolved operations answer capability
//!   queries (*what rectangle will you crop? how small a source do you
//!   need?*) without executing, so upstream fetch/decode stages can
//!   avoid touching pixels they'll never serve.
//! - **Testability**: geometry is pure functions over sizes; the backend
//!   is a trait, so the whole pipeline runs against a recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parser`] | Token grammar — `name:key=value,...` into descriptors |
//! | [`ops`] | The closed operation set, per-op validation, capability protocol |
//! | [`imaging`] | Pure crop/size math, value types, the [`ImageResource`](imaging::ImageResource) seam |
//! | [`executor`] | Orders, resolves, and applies stages; chain-level capability propagation |
//! | [`metadata`] | Stored focal-point lookup behind the [`MetadataStore`](metadata::MetadataStore) trait |
//! | [`config`] | Engine policy: unknown-name handling, output caps |
//!
//! # The smart crop
//!
//! The one piece with real algorithmic content. Given a target size, a
//! focal point, and a closeness level (`close|medium|wide`), it picks a
//! crop that satisfies the target aspect ratio, keeps the focal point
//! visible, grows beyond the bare minimum so context survives, refuses
//! to shrink below a fixed fraction of the source, and clamps to the
//! source bounds by moving — never resizing — the rectangle. See
//! [`imaging::calculations::smart_crop`].
//!
//! # Consistency invariant
//!
//! For any operation and any source size, the capability queries must
//! agree with the mutation: `extracted_region` returns exactly the
//! rectangle `transform` will crop. Everything else in the crate is
//! allowed to be boring; this is not.

pub mod config;
pub mod executor;
pub mod imaging;
pub mod metadata;
pub mod ops;
pub mod parser;

pub use config::{EngineConfig, UnknownOperationPolicy};
pub use executor::{ChainExecutor, ChainOutcome, ExecError, RequestContext};
pub use imaging::{Closeness, ImageSize, Poi, Rectangle};
pub use ops::{Operation, TransformationError};
pub use parser::{Chain, TransformationDescriptor, parse_chain, parse_transformation};
