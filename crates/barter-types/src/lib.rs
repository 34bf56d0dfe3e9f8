pub mod api;
pub mod models;
pub mod pagination;
pub mod policy;
pub mod status;
pub mod validation;
