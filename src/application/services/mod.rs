//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod conversion;

pub use conversion::{
    run_conversion, ConversionService, Converter, ConverterConfig, RenderedOutput,
};
