pub mod record;
pub mod report;
pub mod summary;

pub use record::*;
pub use report::*;
pub use summary::*;
