pub mod maintenance_repository;
pub mod notification_repository;
pub mod resource_repository;
pub mod tada_repository;
pub mod trip_repository;
pub mod user_repository;
