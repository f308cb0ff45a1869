pub mod ai_output;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod store;

pub use providers::{GenerationParams, Operation, ProviderError, TextProvider};
pub use store::{ScanStore, StoreError};
