use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use regex::Regex;
use std::path::PathBuf;

use memcat::procfs::{read_map, Pid, RootedPid, DEFAULT_PROC_ROOT};
use memcat::utils::{get_pid_by_name, summarize_objects};

#[derive(Parser, Debug)]
#[command(name = "memcat")]
#[command(about = "Print the memory map of a process")]
#[command(version)]
struct Args {
    /// PID of the target process
    #[arg(short = 'p', long, conflicts_with = "attach_name")]
    attach_pid: Option<u32>,

    /// Find the target process by name in its command line
    #[arg(short = 'n', long)]
    attach_name: Option<String>,

    /// Where procfs is mounted
    #[arg(long, env = "MEMCAT_PROC_ROOT", default_value = DEFAULT_PROC_ROOT)]
    proc_root: PathBuf,

    /// Only show mappings whose pathname matches this regex
    #[arg(short, long)]
    filter: Option<String>,

    /// List mapped .so files instead of the full map
    #[arg(long)]
    list_so: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    #[cfg(target_os = "android")]
    android_logger::init_once(android_logger::Config::default().with_max_level(level));

    #[cfg(not(target_os = "android"))]
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let target_pid = if let Some(pid) = args.attach_pid {
        Pid::Process(pid)
    } else if let Some(process_name) = &args.attach_name {
        get_pid_by_name(&args.proc_root, process_name)?
    } else {
        Pid::Current
    };

    let filter = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid --filter pattern")?;

    let target = RootedPid::new(&args.proc_root, target_pid);
    let mappings =
        read_map(&target).with_context(|| format!("Failed to read maps of PID {}", target_pid))?;

    if args.list_so {
        let so_files = summarize_objects(&mappings, ".so");

        if so_files.is_empty() {
            println!("[!] No SO files found for PID {}", target_pid);
            return Ok(());
        }

        println!("[+] Found {} SO files:", so_files.len());
        println!(
            "{:<50} {:<18} {:<18} {:<10} {:<20}",
            "Name", "Start", "End", "Size", "Permissions"
        );
        println!("{:-<120}", "");

        for so in so_files {
            let size_str = format!("{}KB", so.size / 1024);
            println!(
                "{:<50} {:<18x} {:<18x} {:<10} {:<20}",
                so.name, so.start, so.end, size_str, so.permissions
            );
        }
    } else {
        for mapping in mappings
            .iter()
            .filter(|m| filter.as_ref().map_or(true, |re| re.is_match(&m.pathname)))
        {
            println!("{}", mapping);
        }
    }

    Ok(())
}
