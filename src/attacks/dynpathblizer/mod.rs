pub mod dynpathblizer;
pub mod dynpathblizer_params;

pub use dynpathblizer::dynpathblizer;
pub use dynpathblizer_params::LeakageMemo;
