pub mod db;
pub mod mem;
pub mod traits;

pub use db::Database;
pub use mem::InMemoryExecutor;
pub use traits::*;
