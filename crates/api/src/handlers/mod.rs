pub mod production_group;
pub mod production_setting;
pub mod rounding;
pub mod specification;
