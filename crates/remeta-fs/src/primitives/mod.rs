pub mod copy_dir;
pub mod promote;
pub mod remove;
pub mod rw;

pub use copy_dir::copy_dir_all;
pub use promote::{move_entry, promote_children};
pub use remove::{EntryKind, remove_entry};
pub use rw::{Options as AtomicWriteOptions, atomic_read, atomic_write};
