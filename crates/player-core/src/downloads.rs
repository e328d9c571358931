mod fetcher;
mod manager;
mod traits;

pub use fetcher::*;
pub use manager::*;
pub use traits::*;
