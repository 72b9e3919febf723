//! Run garbage collection

use crate::util;
use anyhow::{Context, Result};
use idiota_core::store::calculate_dir_size;

pub fn run() -> Result<()> {
    let repo = util::open_repo()?;

    let report = history::gc(&repo).context("Garbage collection failed")?;

    let store_size = calculate_dir_size(repo.objects().root())?;

    if report.removed == 0 && report.failed == 0 {
        println!("{}", util::dimmed("No garbage found"));
        println!("Objects kept: {}", report.kept);
        println!("Store size:   {}", util::format_size(store_size));
        return Ok(());
    }

    println!("{}", util::green("GC complete"));
    println!("Objects kept:    {}", report.kept);
    println!("Objects removed: {}", report.removed);
    println!("Space freed:     {}", util::format_size(report.bytes_freed));
    println!("Store size:      {}", util::format_size(store_size));
    if report.failed > 0 {
        println!("{}", util::red(format!("Failed to remove {} objects", report.failed)));
    }
    Ok(())
}
