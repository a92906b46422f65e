//! Domain layer: entities and the row-to-tree algorithm
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod classifier;
pub mod entities;
pub mod error;
pub mod observer;

pub use arena::{ForestArena, ForestNode};
pub use builder::{DepthPolicy, TreeBuilder};
pub use classifier::classify;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use observer::{ConversionObserver, NullObserver, TracingObserver};
