pub mod edit;
pub mod init;
pub mod inspect;
pub mod schema;
pub mod validate;

pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use schema::{schema, SchemaArgs};
pub use validate::{validate, ValidateArgs};
