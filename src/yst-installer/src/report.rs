use crate::installer::InstallFailure;
use colored::Colorize;
use std::fmt::{self, Write};
use yst_common::asset::ReleaseRepository;
use yst_common::layout::{binary_file_name, host_binary_file_name, InstallLayout};

/// Builds the operator-facing failure report: the error, likely causes, and the steps to
/// install by hand. The platform is only used when it was resolved before the failure.
pub fn render_failure(
    failure: &InstallFailure,
    repository: &ReleaseRepository,
    layout: &InstallLayout,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_failure(&mut out, failure, repository, layout);
    out
}

fn write_failure(
    out: &mut String,
    failure: &InstallFailure,
    repository: &ReleaseRepository,
    layout: &InstallLayout,
) -> fmt::Result {
    let binary_name = match &failure.platform {
        Some(platform) => binary_file_name(repository.tool_name(), platform.os),
        None => host_binary_file_name(repository.tool_name()),
    };
    let bin_dir = layout.bin_dir();
    let releases_page = repository.releases_page();
    let host = releases_page.host_str().unwrap_or("github.com");

    writeln!(out, "Installation failed: {}", failure.error)?;
    writeln!(out)?;
    writeln!(out, "Likely causes:")?;
    writeln!(out, "  1. Network problem - check that GitHub ({host}) is reachable")?;
    writeln!(out, "  2. Release not published yet - wait for the release build to finish")?;
    writeln!(out, "  3. Unsupported platform - check your operating system and architecture")?;
    writeln!(out)?;
    writeln!(out, "Manual installation:")?;
    writeln!(out, "  1. Open the releases page: {releases_page}")?;
    match &failure.platform {
        Some(platform) => writeln!(out, "  2. Download {}", repository.asset_name(platform))?,
        None => writeln!(out, "  2. Download the binary for your platform")?,
    }
    writeln!(out, "  3. Rename it to {binary_name}")?;
    writeln!(out, "  4. Place it in {}", bin_dir.display())?;

    let windows = failure
        .platform
        .map(|platform| platform.os.is_windows())
        .unwrap_or(cfg!(windows));
    if !windows {
        writeln!(
            out,
            "  5. Make it executable: chmod +x {}",
            bin_dir.join(&binary_name).display()
        )?;
    }

    Ok(())
}

pub fn print_failure(
    failure: &InstallFailure,
    repository: &ReleaseRepository,
    layout: &InstallLayout,
) {
    let report = render_failure(failure, repository, layout);
    let mut lines = report.lines();
    if let Some(headline) = lines.next() {
        eprintln!("\n{}", headline.red().bold());
    }
    for line in lines {
        eprintln!("{line}");
    }
}
