pub mod maintenance_routes;
pub mod notification_routes;
pub mod resource_routes;
pub mod tada_routes;
pub mod trip_routes;
