pub mod book;
pub mod event;
pub mod observation;
pub mod record;
pub mod report;
pub mod store;
pub mod target;

// Re-exports for convenience
pub use book::*;
pub use event::*;
pub use observation::*;
pub use record::*;
pub use report::*;
pub use store::*;
pub use target::*;
