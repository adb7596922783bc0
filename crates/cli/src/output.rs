//! Output formatting for scan reports

use anyhow::Result;
use serde_json::json;
use std::time::Duration;

use netsweep_orchestrator::ScanReport;

/// Print a report in the specified format
pub fn print_report(report: &ScanReport, format: &str) -> Result<()> {
    let format = format.trim().to_lowercase();
    match format.as_str() {
        "json" | "j" => println!("{}", render_json(report)?),
        "csv" | "c" => print!("{}", render_csv(report)),
        "text" | "t" | "" => println!("{report}"),
        _ => {
            eprintln!("Warning: Unknown format '{}', using text format", format);
            println!("{report}");
        }
    }

    if let Some(notice) = partial_notice(report) {
        eprintln!("{notice}");
    }
    Ok(())
}

/// Why an incomplete report is incomplete, for stderr.
fn partial_notice(report: &ScanReport) -> Option<String> {
    if report.is_complete() {
        return None;
    }
    let stats = report.stats();
    let mut notice = format!(
        "Note: results are partial ({} of {} probes finished",
        stats.scanned, stats.total_targets
    );
    if stats.allocation_failures > 0 {
        notice.push_str(&format!(
            "; {} target(s) skipped because no socket could be allocated",
            stats.allocation_failures
        ));
    }
    if stats.scanned + stats.allocation_failures < stats.total_targets {
        notice.push_str(&format!(
            "; scan deadline reached after {}",
            format_duration(stats.elapsed)
        ));
    }
    notice.push_str(").");
    Some(notice)
}

fn render_json(report: &ScanReport) -> Result<String> {
    let stats = report.stats();
    let output = json!({
        "scan_info": {
            "duration_seconds": stats.elapsed.as_secs_f64(),
            "duration_formatted": format_duration(stats.elapsed),
            "complete": report.is_complete(),
        },
        "report": serde_json::to_value(report)?,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_csv(report: &ScanReport) -> String {
    let mut csv = String::new();
    match report {
        ScanReport::Discovery { live_hosts, .. } => {
            csv.push_str("ip\n");
            for ip in live_hosts {
                csv.push_str(&format!("{ip}\n"));
            }
        }
        ScanReport::PortScan {
            address,
            open_ports,
            ..
        } => {
            csv.push_str("ip,port,state\n");
            for port in open_ports {
                csv.push_str(&format!("{address},{port},open\n"));
            }
        }
    }
    csv
}

/// Format duration in a human-readable way
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs == 0 {
        format!("{}ms", millis)
    } else if total_secs < 60 {
        if millis > 0 {
            format!("{}.{:03}s", total_secs, millis)
        } else {
            format!("{}s", total_secs)
        }
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        if secs > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}m", mins)
        }
    }
}
