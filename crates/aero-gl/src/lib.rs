//! `aero-gl` tracks legacy (GL-style) graphics state on top of Vulkan.
//!
//! The legacy API is a large global state machine; the explicit API wants pipeline objects
//! and per-draw commands. This crate sits between the two:
//! - [`GlState`] stores every piece of legacy state in fixed arrays and records what changed in
//!   a [`DirtyTracker`].
//! - [`GlState::pipeline_hash`] keys a [`PipelineCache`] and [`PipelineDescription`] fills the
//!   create-info structs on a miss.
//! - The `sync_*` entry points turn dirty categories into commands on a
//!   [`CommandSink`](sync::CommandSink), either recorded or written straight into a
//!   `vk::CommandBuffer` (see [`sync::AshCommandSink`]).

mod handle;
mod shared;

pub mod config;
pub mod deferred;
pub mod dirty;
pub mod gl;
pub mod handle_table;
pub mod pipeline_cache;
pub mod pipeline_desc;
pub mod pipeline_hash;
pub mod state;
pub mod sync;
pub mod translate;
pub mod types;
pub mod validation;
pub mod vertex_array;

pub use config::{StateConfig, ThreadingMode};
pub use deferred::{DeferredDeletionQueue, ResourceDestroyer};
pub use dirty::{DirtyTracker, StateCategory, StateMask};
pub use handle::{Handle, HandleAllocator, ResourceKind};
pub use handle_table::HandleTable;
pub use pipeline_cache::{PipelineCache, PipelineCacheStats};
pub use pipeline_desc::PipelineDescription;
pub use pipeline_hash::{PipelineStateHash, PipelineStateHasher};
pub use shared::{SharedGlState, StateStore};
pub use state::GlState;
pub use sync::{CommandRecorder, CommandSink, RecordedCommand};
pub use validation::ValidationError;
pub use vertex_array::VertexLayoutSnapshot;
