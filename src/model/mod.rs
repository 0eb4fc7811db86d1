pub mod course;
pub mod tree;
pub mod view_state;
