//! Core processing: signing, classification, allocation, orchestration

pub mod classifier;
pub mod gateway;
pub mod signature;
pub mod split;

pub use gateway::Gateway;
pub use signature::Signable;
pub use split::Allocation;
