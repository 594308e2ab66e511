pub mod filter;
pub mod ops;
pub mod pipeline;
pub mod ratio;
