mod lines;
mod process;
mod types;

pub use lines::{read_lines, FsLines, LineSource};
pub use process::{get_pid_by_name, summarize_objects};
pub use types::ObjectInfo;
