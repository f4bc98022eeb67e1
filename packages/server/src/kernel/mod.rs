// Infrastructure behind trait seams: the generative model and its test double.

pub mod ai;
pub mod test_dependencies;
pub mod traits;

pub use ai::GeminiModel;
pub use traits::*;
