/// Kernel extraction from sample volumes
pub mod patterns;
/// Rule sets consumed by generation
pub mod rules;
/// Neighbour co-occurrence statistics
pub mod statistics;
