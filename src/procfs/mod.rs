mod maps;
mod pid;

pub use maps::{
    parse_mapping_fields, read_map, read_map_with, Device, FieldDefect, MapError, Mapping,
    ParseError, Permset, Sharing,
};
pub use pid::{Pid, PidError, ProcessDir, RootedPid, DEFAULT_PROC_ROOT};
