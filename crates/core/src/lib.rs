//! Pure domain logic for the print pricing service.
//!
//! Nothing in this crate performs I/O. Persistence lives in `printshop-db`
//! and the HTTP surface in `printshop-api`; both hand already-loaded data to
//! the functions here.

pub mod error;
pub mod pricing;
pub mod specification;
pub mod types;
