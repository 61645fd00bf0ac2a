pub mod sections;
pub mod spc;
pub mod variants;

pub use spc::extract_spc;
pub use variants::extract_variants;
