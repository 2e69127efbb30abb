//! Entity type definitions

pub mod company;
pub mod customer;
pub mod estimate;
pub mod settings;
pub mod vehicle;
pub mod work_order;

pub use company::{Company, User};
pub use customer::Customer;
pub use estimate::{Estimate, EstimateItem};
pub use settings::ShopSettings;
pub use vehicle::Vehicle;
pub use work_order::{WorkOrder, WorkTask};
