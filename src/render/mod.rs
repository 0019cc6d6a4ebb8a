pub mod context;
pub mod dashboard;
pub mod filter_sidebar;
pub mod layout;
pub mod overlays;
