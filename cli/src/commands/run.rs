use edgeprobe_common::config::Config;
use edgeprobe_common::results::ScanResult;
use edgeprobe_core::export;
use tracing::{info, warn};

use crate::commands::{Options, scan, test};

/// Both phases. An existing scan table is reused unless `--refresh` is set.
pub async fn run(opts: &Options, cfg: &Config) -> anyhow::Result<()> {
    let scan_results = match reusable_scan(opts, cfg) {
        Some(results) => results,
        None => scan::scan(opts, cfg).await?,
    };
    test::test(opts, cfg, &scan_results).await?;
    Ok(())
}

fn reusable_scan(opts: &Options, cfg: &Config) -> Option<Vec<ScanResult>> {
    if opts.refresh {
        return None;
    }
    let path = opts.paths(cfg).scan_table;
    if !path.exists() {
        return None;
    }
    match export::import_scan(&path) {
        Ok(results) if !results.is_empty() => {
            info!(
                "Reusing {} results from {} (pass --refresh to scan again)",
                results.len(),
                path.display()
            );
            Some(results)
        }
        Ok(_) => None,
        Err(e) => {
            warn!("{e}, scanning again");
            None
        }
    }
}
