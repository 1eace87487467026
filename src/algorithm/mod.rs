/// Bitset domains over interned symbols
pub mod bitset;
/// Memoization of kernel fit tests
pub mod cache;
/// Collapse driver, failure policies and the random source seam
pub mod executor;
/// Depth-bounded kernel propagation
pub mod propagation;
/// Region partitioning and reset after failure
pub mod recovery;
/// Minimum-entropy cell selection and symbol choice
pub mod selection;
