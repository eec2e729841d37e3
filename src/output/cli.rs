use crate::model::{Finding, ScanResult};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Vulnerable Versions")]
    vulnerable: String,
    #[tabled(rename = "File")]
    file: String,
}

pub fn print_cli_table(result: &ScanResult) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        result.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Manifest files scanned: {}", result.files_scanned);
    println!();

    if result.findings.is_empty() {
        println!("\x1b[32m\x1b[1mNo vulnerable packages found.\x1b[0m");
        println!();
        return Ok(());
    }

    println!("Found {} findings:", result.findings.len());
    println!();

    let rows: Vec<FindingRow> = result
        .findings
        .iter()
        .map(|f| FindingRow {
            status: format_status(f),
            package: truncate(&f.package, 40),
            installed: f.installed_version.clone(),
            vulnerable: truncate(&f.vulnerable_versions.join(", "), 40),
            file: truncate(&f.file.display().to_string(), 60),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    println!();
    print_summary(result);

    Ok(())
}

fn format_status(finding: &Finding) -> String {
    if finding.exact_match {
        "\x1b[31m\x1b[1mEXACT MATCH\x1b[0m".to_string()
    } else {
        "\x1b[33mDIFFERENT VERSION\x1b[0m".to_string()
    }
}

// Counts chars, not bytes: scanned paths and package names can carry
// multibyte UTF-8 and must never split a char.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn print_summary(result: &ScanResult) {
    println!("Summary:");
    println!(
        "  \x1b[31mExact matches (critical):\x1b[0m {}",
        result.exact_matches()
    );
    println!(
        "  \x1b[33mDifferent versions (warning):\x1b[0m {}",
        result.different_versions()
    );
    println!("  Total findings: {}", result.findings.len());
}
