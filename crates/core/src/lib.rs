pub mod models;
pub mod timeframe;
pub mod traits;

pub use models::*;
pub use timeframe::*;
pub use traits::*;
