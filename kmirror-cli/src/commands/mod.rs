pub mod slug;
pub mod sync;
