pub mod focus;
pub mod registry;
pub mod router;
