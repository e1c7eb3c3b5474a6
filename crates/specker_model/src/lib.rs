//! # specker_model
//!
//! Typed document model for RPM spec files, with pluggable readers and
//! renderers and a transformator that transformation passes work through.
//!
//! ## Pipeline
//!
//! raw text → [`SpecModelReader`] → [`SpecModel`] → zero or more
//! [`TransformationPass`]es via [`SpecModelTransformator`] →
//! [`SpecModelRenderer`] → text.
//!
//! Untouched sections are reproduced byte-for-byte by the
//! [`OriginalLayoutRenderer`]; sections changed through the
//! [`SpecModelManipulator`] contract are marked dirty and re-synthesized.
//!
//! ## Example
//!
//! ```rust
//! use specker_model::{
//!     shared, OriginalLayoutRenderer, SpecFileReader, SpecModelManipulator,
//!     SpecModelReader, SpecModelRenderer, SpecModelTransformator,
//! };
//!
//! let reader = shared(SpecFileReader::new());
//! reader
//!     .borrow_mut()
//!     .parse_str("Name: foo\nVersion: 1.0\n%description\nA tool.\n")
//!     .unwrap();
//!
//! let model = reader.borrow_mut().take_model();
//! let mut transformator = SpecModelTransformator::new(model);
//! transformator.set_tag_value("Version", "1.1");
//! reader.borrow_mut().set_model(transformator.into_model());
//!
//! let renderer = OriginalLayoutRenderer::new(reader);
//! assert_eq!(
//!     renderer.render().unwrap(),
//!     "Name: foo\nVersion: 1.1\n%description\nA tool.\n"
//! );
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod manipulator;
pub mod model;
pub mod reader;
pub mod renderer;
pub mod section;
pub mod tokenizer;
pub mod transformator;

pub use config::{Layout, NewlineStyle, ReaderConfig, RenderConfig, SpeckerConfig};
pub use diagnostics::Diagnostics;
pub use error::{SpecError, SpecResult};
pub use manipulator::SpecModelManipulator;
pub use model::SpecModel;
pub use reader::{shared, SharedReader, SpecFileReader, SpecModelReader};
pub use renderer::{renderer_for, NormalizedRenderer, OriginalLayoutRenderer, SpecModelRenderer};
pub use section::{BodyLine, LineEnding, SectionKind, SpecSection};
pub use transformator::{SpecModelTransformator, TransformationPass};
