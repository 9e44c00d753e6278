pub mod db;
pub mod fixtures;
pub mod seed;
pub mod temp;

pub use db::TestDb;
pub use seed::SeededPage;
pub use temp::TempDir;
