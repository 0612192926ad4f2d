use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use log::debug;

use super::types::ObjectInfo;
use crate::procfs::{Mapping, Pid};

/// Finds the first process under `proc_root` whose command line mentions `process_name`.
pub fn get_pid_by_name(proc_root: &Path, process_name: &str) -> Result<Pid> {
    let proc_dir = fs::read_dir(proc_root)?;

    for entry in proc_dir {
        let entry = entry?;
        let file_name = entry.file_name();
        let pid_str = file_name.to_string_lossy();

        if let Ok(pid) = pid_str.parse::<u32>() {
            let cmdline_path = entry.path().join("cmdline");
            if let Ok(cmdline) = fs::read(&cmdline_path) {
                if String::from_utf8_lossy(&cmdline).contains(process_name) {
                    debug!("{} matched pid {}", process_name, pid);
                    return Ok(Pid::Process(pid));
                }
            }
        }
    }

    Err(anyhow!("Process {} not found", process_name))
}

/// Groups file-backed mappings whose path contains `needle` by file name,
/// merging their address ranges.
pub fn summarize_objects(mappings: &[Mapping], needle: &str) -> Vec<ObjectInfo> {
    let mut objects: HashMap<String, ObjectInfo> = HashMap::new();

    for mapping in mappings {
        if mapping.is_anonymous() || !mapping.pathname.contains(needle) {
            continue;
        }

        let name = mapping
            .pathname
            .rsplit('/')
            .next()
            .unwrap_or(&mapping.pathname)
            .to_string();

        if let Some(existing) = objects.get_mut(&name) {
            existing.start = existing.start.min(mapping.address_start);
            existing.end = existing.end.max(mapping.address_end);
            existing.size = existing.end - existing.start;
        } else {
            objects.insert(
                name.clone(),
                ObjectInfo {
                    name,
                    path: mapping.pathname.clone(),
                    start: mapping.address_start,
                    end: mapping.address_end,
                    size: mapping.size(),
                    permissions: mapping.perms.to_string(),
                },
            );
        }
    }

    let mut result: Vec<ObjectInfo> = objects.into_values().collect();
    result.sort_by(|a, b| a.start.cmp(&b.start));
    result
}
