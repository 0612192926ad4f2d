//! Typed access to the `/proc/<pid>/maps` memory mapping table.
//!
//! ```no_run
//! use memcat::procfs::{read_map, Pid};
//!
//! for mapping in read_map(&Pid::Current)? {
//!     println!("{}", mapping);
//! }
//! # Ok::<(), memcat::procfs::MapError>(())
//! ```

pub mod procfs;
pub mod utils;
