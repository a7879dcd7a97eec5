//! Parsers for `cf` service listings
//!
//! The `cf services` table is fixed-width, with column positions defined
//! by the header row:
//!
//! ```text
//! name            service           plan   bound apps      last operation
//! my-analyzer     Static Analyzer   free   bridge, other   create succeeded
//! ```
//!
//! The header's column offsets are discovered first and every following
//! row is sliced by them, so a service label appearing inside an instance
//! name cannot cause a false match.

/// Column offsets discovered from the table header.
struct TableColumns {
    service_start: usize,
    service_end: usize,
    bound_start: usize,
    bound_end: usize,
}

impl TableColumns {
    fn from_header(line: &str) -> Option<Self> {
        let service_start = line.find("service")?;
        let service_end = line.find("plan")?.checked_sub(1)?;
        let bound_start = line.find("bound apps")?;
        let bound_end = line.find("last operation")?;
        Some(Self {
            service_start,
            service_end,
            bound_start,
            bound_end,
        })
    }
}

/// Slice a row by column offsets, tolerating short lines and offsets
/// that land inside a multibyte character. Instance and app names are
/// user-chosen, so rows can shift the byte grid the header established.
fn column<'l>(line: &'l str, start: usize, end: usize) -> &'l str {
    let len = line.len();
    let mut start = start.min(len);
    let mut end = end.min(len).max(start);
    while !line.is_char_boundary(start) {
        start -= 1;
    }
    while !line.is_char_boundary(end) {
        end += 1;
    }
    &line[start..end]
}

/// Find the instance name of `service` in a `cf services` table.
pub fn find_service_name(table: &str, service: &str) -> Option<String> {
    let mut columns: Option<TableColumns> = None;

    for line in table.lines() {
        match &columns {
            None => {
                if line.starts_with("name") {
                    columns = TableColumns::from_header(line);
                }
            }
            Some(cols) => {
                if column(line, cols.service_start, cols.service_end).contains(service) {
                    let name = column(line, 0, cols.service_start).trim();
                    if !name.is_empty() {
                        return Some(name.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Find the first app bound to `service` in a `cf services` table.
pub fn find_bound_app(table: &str, service: &str) -> Option<String> {
    let mut columns: Option<TableColumns> = None;

    for line in table.lines() {
        match &columns {
            None => {
                if line.starts_with("name") {
                    columns = TableColumns::from_header(line);
                }
            }
            Some(cols) => {
                if column(line, cols.service_start, cols.service_end).contains(service) {
                    let apps = column(line, cols.bound_start, cols.bound_end);
                    // only the first of a comma-separated binding list matters
                    let first = apps.split(',').next().unwrap_or("").trim();
                    if !first.is_empty() {
                        return Some(first.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Extract the dashboard URL from `cf service "<name>"` output.
pub fn parse_dashboard(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("Dashboard: "))
        .map(|url| url.to_string())
}
