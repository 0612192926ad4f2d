use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use log::{debug, trace, warn};
use thiserror::Error;

use super::pid::ProcessDir;
use crate::utils::{FsLines, LineSource};

const MAPS_FILE: &str = "maps";
const MANDATORY_FIELDS: usize = 5;
const PATHNAME_FIELD: usize = 5;
const PERM_SYMBOLS: usize = 4;

/// Why a numeric field could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldDefect {
    #[error("expected two values separated by {0:?}")]
    Split(char),
    #[error("unexpected sign in unsigned value")]
    Signed,
    #[error(transparent)]
    Digits(#[from] ParseIntError),
}

/// A single line of the maps table that could not be turned into a [`Mapping`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected number of fields in map entry: {0}")]
    WrongFieldCount(usize),
    #[error("unable to parse address range {text:?}")]
    MalformedAddressRange {
        text: String,
        #[source]
        defect: FieldDefect,
    },
    #[error("empty or impossible address range {start:#x}-{end:#x}")]
    EmptyOrInvertedRange { start: u64, end: u64 },
    #[error("unexpected number of perm symbols in {text:?}: {len}")]
    MalformedPermissions { text: String, len: usize },
    #[error("unable to parse offset {text:?}")]
    MalformedOffset {
        text: String,
        #[source]
        defect: FieldDefect,
    },
    #[error("unable to parse device {text:?}")]
    MalformedDevice {
        text: String,
        #[source]
        defect: FieldDefect,
    },
    #[error("unable to parse inode {text:?}")]
    MalformedInode {
        text: String,
        #[source]
        defect: FieldDefect,
    },
}

/// Failure of a whole table read. Nothing is returned alongside it.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
}

impl MapError {
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            MapError::Parse { source, .. } => Some(source),
            MapError::Io(_) => None,
        }
    }
}

/// Shared/private state of a mapping, as a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sharing {
    Shared,
    Private,
    Neither,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permset {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
    pub shared: bool,
    pub private: bool,
}

impl Permset {
    fn from_symbols(symbols: &[u8; PERM_SYMBOLS]) -> Self {
        Permset {
            read: symbols[0] == b'r',
            write: symbols[1] == b'w',
            execute: symbols[2] == b'x',
            shared: symbols[3] == b's',
            private: symbols[3] == b'p',
        }
    }

    pub fn sharing(&self) -> Sharing {
        match (self.shared, self.private) {
            (true, _) => Sharing::Shared,
            (false, true) => Sharing::Private,
            (false, false) => Sharing::Neither,
        }
    }
}

impl fmt::Display for Permset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        let sharing = match self.sharing() {
            Sharing::Shared => 's',
            Sharing::Private => 'p',
            Sharing::Neither => '-',
        };
        write!(
            f,
            "{}{}{}{}",
            flag(self.read, 'r'),
            flag(self.write, 'w'),
            flag(self.execute, 'x'),
            sharing
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Device {
    pub major: u64,
    pub minor: u64,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}", self.major, self.minor)
    }
}

/// One region of a process address space, as listed in `/proc/<pid>/maps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub address_start: u64,
    pub address_end: u64,
    pub perms: Permset,
    pub offset: u64,
    pub dev: Device,
    pub inode: u64,
    pub pathname: String,
}

impl Mapping {
    /// Zero for a hand-built mapping whose end is not above its start.
    pub fn size(&self) -> u64 {
        self.address_end.saturating_sub(self.address_start)
    }

    pub fn contains(&self, address: u64) -> bool {
        (self.address_start..self.address_end).contains(&address)
    }

    /// True for mappings with no backing file: no path at all, or a
    /// kernel pseudo-path such as `[heap]` or `[stack]`.
    pub fn is_anonymous(&self) -> bool {
        self.inode == 0
            && (self.pathname.is_empty()
                || (self.pathname.starts_with('[') && self.pathname.ends_with(']')))
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}-{:08x} {} {:08x} {} {}",
            self.address_start, self.address_end, self.perms, self.offset, self.dev, self.inode
        )?;
        if !self.pathname.is_empty() {
            write!(f, " {}", self.pathname)?;
        }
        Ok(())
    }
}

impl FromStr for Mapping {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        parse_mapping_fields(&fields)
    }
}

// from_str_radix takes a leading '+', the maps format never has one
fn parse_unsigned(text: &str, radix: u32) -> Result<u64, FieldDefect> {
    if text.starts_with('+') {
        return Err(FieldDefect::Signed);
    }
    Ok(u64::from_str_radix(text, radix)?)
}

fn split_hex_pair(text: &str, separator: char) -> Result<(u64, u64), FieldDefect> {
    let (left, right) = text
        .split_once(separator)
        .ok_or(FieldDefect::Split(separator))?;
    Ok((parse_unsigned(left, 16)?, parse_unsigned(right, 16)?))
}

/// Builds a [`Mapping`] from the whitespace-separated fields of one maps line.
///
/// A pathname containing whitespace arrives split over several fields; those
/// are joined back together without any separator, so the original spacing
/// inside such a path is not recovered.
pub fn parse_mapping_fields(fields: &[&str]) -> Result<Mapping, ParseError> {
    if fields.len() < MANDATORY_FIELDS {
        return Err(ParseError::WrongFieldCount(fields.len()));
    }

    let (address_start, address_end) = split_hex_pair(fields[0], '-').map_err(|defect| {
        ParseError::MalformedAddressRange {
            text: fields[0].to_string(),
            defect,
        }
    })?;
    if address_end <= address_start {
        return Err(ParseError::EmptyOrInvertedRange {
            start: address_start,
            end: address_end,
        });
    }

    let perms: &[u8; PERM_SYMBOLS] =
        fields[1]
            .as_bytes()
            .try_into()
            .map_err(|_| ParseError::MalformedPermissions {
                text: fields[1].to_string(),
                len: fields[1].len(),
            })?;
    let perms = Permset::from_symbols(perms);

    let offset =
        parse_unsigned(fields[2], 16).map_err(|defect| ParseError::MalformedOffset {
            text: fields[2].to_string(),
            defect,
        })?;

    let (major, minor) =
        split_hex_pair(fields[3], ':').map_err(|defect| ParseError::MalformedDevice {
            text: fields[3].to_string(),
            defect,
        })?;

    let inode = parse_unsigned(fields[4], 10).map_err(|defect| ParseError::MalformedInode {
        text: fields[4].to_string(),
        defect,
    })?;

    let pathname = fields[PATHNAME_FIELD.min(fields.len())..].concat();

    Ok(Mapping {
        address_start,
        address_end,
        perms,
        offset,
        dev: Device { major, minor },
        inode,
        pathname,
    })
}

/// Reads and parses `/proc/<pid>/maps` from the filesystem.
pub fn read_map<P: ProcessDir + ?Sized>(pid: &P) -> Result<Vec<Mapping>, MapError> {
    read_map_with(&FsLines, pid)
}

/// Reads the maps table of `pid` through `source`. The first bad line aborts
/// the read.
pub fn read_map_with<S, P>(source: &S, pid: &P) -> Result<Vec<Mapping>, MapError>
where
    S: LineSource + ?Sized,
    P: ProcessDir + ?Sized,
{
    let maps_path = pid.dir().join(MAPS_FILE);
    debug!("reading memory map from {}", maps_path.display());

    let lines = source.read_lines(&maps_path)?;
    let mut maps = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        trace!("{}:{}: {}", maps_path.display(), index + 1, line);
        let fields: Vec<&str> = line.split_whitespace().collect();
        let mapping = parse_mapping_fields(&fields).map_err(|source| {
            warn!("{}:{}: {}", maps_path.display(), index + 1, source);
            MapError::Parse {
                line: index + 1,
                source,
            }
        })?;
        maps.push(mapping);
    }

    debug!("parsed {} mappings from {}", maps.len(), maps_path.display());
    Ok(maps)
}
