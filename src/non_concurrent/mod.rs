// single-threaded data structures; callers bring their own locking
pub mod rbtree;
