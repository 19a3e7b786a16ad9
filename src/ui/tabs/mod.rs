pub mod dashboard;
pub mod deliveries;
pub mod profile;
pub mod robots;
pub mod sensors;
pub mod users;
