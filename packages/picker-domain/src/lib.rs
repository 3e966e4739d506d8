pub mod query;
pub mod request;
pub mod safety;
pub mod sample;

pub use picker_config::RetrievalMode;
