/// Address extent covered by every segment of one mapped file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub name: String,
    pub path: String,
    pub start: u64,
    pub end: u64,
    pub size: u64,
    pub permissions: String,
}
