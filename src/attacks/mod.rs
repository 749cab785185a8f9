pub mod actbayesian;
pub mod baseline;
pub mod dynpathblizer;
pub mod treesumexplorer;
