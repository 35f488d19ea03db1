mod display;
mod tree_node;
mod utils;
