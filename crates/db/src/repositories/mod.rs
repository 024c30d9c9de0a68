//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod production_group_repo;
pub mod production_setting_repo;
pub mod rounding_repo;
pub mod specification_repo;

pub use production_group_repo::ProductionGroupRepo;
pub use production_setting_repo::ProductionSettingRepo;
pub use rounding_repo::RoundingRepo;
pub use specification_repo::{NormalizationReport, SpecificationRepo};
