pub mod builders;
pub mod mock_registry;
pub mod strategies;

pub use builders::*;
pub use mock_registry::*;
pub use strategies::*;
