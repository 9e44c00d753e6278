pub mod partial_import_service;
pub mod template_source;

pub use partial_import_service::*;
pub use template_source::*;
