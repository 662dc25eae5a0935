pub mod date_handling;
pub mod http;
pub mod http_path_resolution;
pub mod schema_validation;
pub mod text_processing;

pub use date_handling::*;
pub use http::*;
pub use http_path_resolution::*;
pub use schema_validation::*;
pub use text_processing::*;
