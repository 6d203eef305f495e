pub mod app;
mod deserializers;
pub mod error;
pub mod pagination;
mod routes;
