pub mod call;
pub mod index;
pub mod module;

pub use call::CallResolver;
pub use index::{FileId, FileIndex, IndexedFile, normalize};
pub use module::ModuleResolver;
