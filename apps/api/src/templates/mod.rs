// Template Renderer: a fixed catalog of visual templates and a registry of pure layout
// functions that turn a resume document into a preview tree.

pub mod catalog;
pub mod layouts;
pub mod registry;
pub mod tree;

pub use catalog::{TemplateSpec, DEFAULT_TEMPLATE_ID};
pub use registry::{RenderedPreview, TemplateRegistry};
pub use tree::Theme;
