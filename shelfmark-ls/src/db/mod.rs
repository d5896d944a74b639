//! Database access for the library service
//!
//! Per-entity operation modules over the shared pool. Schema creation and
//! seeding live in shelfmark-common; everything here assumes an
//! initialized database. Multi-table writes run inside explicit
//! transactions so a failure leaves no partial state.

pub mod books;
pub mod labels;
pub mod reading_status;
pub mod users;
