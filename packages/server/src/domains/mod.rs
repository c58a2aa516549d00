// Business domains
pub mod membership;
pub mod sync;
