// Adapters layer: concrete implementations of the collaborator ports.

pub mod declared_vision;
pub mod file_source;
pub mod template_writer;

pub use declared_vision::DeclaredAttributes;
pub use file_source::FileListingSource;
pub use template_writer::TemplateCopyWriter;
