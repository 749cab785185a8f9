pub mod partition_tree;

pub use partition_tree::TreeNode;
