//! HTTP API handlers for the library service
//!
//! The boundary where the excluded UI/scanner collaborators live. All
//! handlers take primitive ids and plain request structs and return JSON;
//! no store internals or password fields cross this boundary outbound.

pub mod books;
pub mod health;
pub mod labels;
pub mod lookup;
pub mod users;

pub use books::book_routes;
pub use health::health_routes;
pub use labels::label_routes;
pub use lookup::lookup_routes;
pub use users::user_routes;
