pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod requests;
pub mod search;
pub mod tristate;

pub use catalog::*;
pub use config::*;
pub use content::*;
pub use error::*;
pub use requests::*;
pub use search::*;
pub use tristate::*;
