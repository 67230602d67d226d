pub mod scoring;
pub mod stats;
