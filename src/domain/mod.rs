pub mod filter;
pub mod pagination;
pub mod repository;
pub mod task;
