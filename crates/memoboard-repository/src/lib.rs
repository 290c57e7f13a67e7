//! # Memoboard Repository
//!
//! Access to the relational store:
//!
//! ```text
//! Feed assembler / reindexer / auth
//!   ↓  Arc<dyn UserRepository>, Arc<dyn MemoRepository>
//! MySqlUserRepository, MySqlMemoRepository
//!   ↓  DatabasePool::acquire() -> scoped connection guard
//! MySQL
//! ```
//!
//! Every store failure is returned to the caller; nothing here retries.

pub mod mysql;
pub mod pool;
pub mod traits;

pub use mysql::*;
pub use pool::*;
pub use traits::*;
