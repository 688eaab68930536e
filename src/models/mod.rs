pub mod maintenance;
pub mod notification;
pub mod resource;
pub mod tada;
pub mod trip;
pub mod user;
