pub mod availability;
pub mod maintenance_service;
pub mod notification_service;
pub mod tada_service;
pub mod trip_service;
