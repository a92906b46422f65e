//! tabtree: rebuild hierarchies from indentation-encoded delimited files.
//!
//! Every hierarchy level occupies a group of three columns (label, Id, link).
//! A row's depth is the number of groups it fills; rows attach under the
//! latest node one level up. The resulting forest renders as XML, JSON or a
//! terminal tree.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{run_conversion, Converter, ConverterConfig, RenderedOutput};
pub use application::{ApplicationError, ApplicationResult, Format};
pub use domain::{DepthPolicy, TreeNode};
