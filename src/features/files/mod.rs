pub mod cache;
pub mod dtos;
pub mod events;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod workers;

pub use cache::ListingCache;
pub use repositories::PgFileRepository;
pub use routes::routes;
pub use services::{FileService, UploadLimits};
pub use workers::FileProcessor;
