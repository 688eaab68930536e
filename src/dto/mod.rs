pub mod common;
pub mod maintenance_dto;
pub mod notification_dto;
pub mod tada_dto;
pub mod trip_dto;
