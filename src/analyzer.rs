use crate::parser::{Counts, LogAggregates};
use serde::Serialize;

/// A key (address or endpoint) with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedItem {
    pub value: String,
    pub count: usize,
}

/// An address whose failed logins exceeded the threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedIp {
    pub ip: String,
    pub failed_logins: usize,
    pub total_requests: usize,
}

/// Derived views over the parsed aggregates, ready to be reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub requests_per_ip: Vec<RankedItem>,
    pub most_accessed_endpoint: Option<RankedItem>,
    pub suspicious: Vec<FlaggedIp>,
    pub failed_login_threshold: usize,
    pub total_requests: usize,
    pub lines_read: usize,
    pub lines_skipped: usize,
}

/// Build the reportable views from the aggregates.
///
/// Addresses are ordered by request count, highest first. Equal counts keep
/// the order in which the addresses first appeared in the log.
pub fn analyze(aggregates: &LogAggregates, failed_login_threshold: usize) -> AnalysisSummary {
    let mut requests_per_ip: Vec<RankedItem> = aggregates
        .request_counts
        .iter()
        .map(|(ip, &count)| RankedItem {
            value: ip.clone(),
            count,
        })
        .collect();
    // stable: ties stay in first-appearance order
    requests_per_ip.sort_by(|a, b| b.count.cmp(&a.count));

    let suspicious = aggregates
        .failed_login_counts
        .iter()
        .filter(|(_, &failed)| failed > failed_login_threshold)
        .map(|(ip, &failed)| FlaggedIp {
            ip: ip.clone(),
            failed_logins: failed,
            total_requests: aggregates.request_counts.get(ip).copied().unwrap_or(0),
        })
        .collect();

    AnalysisSummary {
        requests_per_ip,
        most_accessed_endpoint: most_accessed(&aggregates.endpoint_counts),
        suspicious,
        failed_login_threshold,
        total_requests: aggregates.request_counts.values().sum(),
        lines_read: aggregates.lines_read,
        lines_skipped: aggregates.lines_skipped,
    }
}

/// Entry with the highest count; the first one seen wins a tie.
pub fn most_accessed(counts: &Counts) -> Option<RankedItem> {
    let mut best: Option<(&String, usize)> = None;
    for (key, &count) in counts {
        match best {
            Some((_, top)) if count <= top => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, count)| RankedItem {
        value: key.clone(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregates(lines: &[&str]) -> LogAggregates {
        let mut agg = LogAggregates::default();
        for line in lines {
            agg.ingest_line(line);
        }
        agg
    }

    fn request(ip: &str, endpoint: &str, status: u16) -> String {
        format!("{} - - \"GET {} HTTP/1.1\" {} -", ip, endpoint, status)
    }

    #[test]
    fn sorts_requests_descending_with_stable_ties() {
        let lines = [
            request("3.3.3.3", "/", 200),
            request("1.1.1.1", "/", 200),
            request("2.2.2.2", "/", 200),
            request("1.1.1.1", "/", 200),
            request("2.2.2.2", "/", 200),
            request("4.4.4.4", "/", 200),
        ];
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let summary = analyze(&aggregates(&refs), 10);

        let order: Vec<(&str, usize)> = summary
            .requests_per_ip
            .iter()
            .map(|r| (r.value.as_str(), r.count))
            .collect();
        assert_eq!(
            order,
            vec![("1.1.1.1", 2), ("2.2.2.2", 2), ("3.3.3.3", 1), ("4.4.4.4", 1)]
        );
        assert!(summary
            .requests_per_ip
            .windows(2)
            .all(|pair| pair[0].count >= pair[1].count));
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let mut lines = Vec::new();
        for _ in 0..10 {
            lines.push(request("10.0.0.1", "/login", 401));
        }
        for _ in 0..11 {
            lines.push(request("10.0.0.2", "/login", 401));
        }
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let summary = analyze(&aggregates(&refs), 10);

        assert_eq!(
            summary.suspicious,
            vec![FlaggedIp {
                ip: "10.0.0.2".to_string(),
                failed_logins: 11,
                total_requests: 11,
            }]
        );
    }

    #[test]
    fn most_accessed_prefers_first_seen_on_tie() {
        let lines = [
            request("1.1.1.1", "/b", 200),
            request("1.1.1.1", "/a", 200),
            request("1.1.1.1", "/a", 200),
            request("1.1.1.1", "/b", 200),
        ];
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let summary = analyze(&aggregates(&refs), 10);
        assert_eq!(
            summary.most_accessed_endpoint,
            Some(RankedItem {
                value: "/b".to_string(),
                count: 2
            })
        );
    }

    #[test]
    fn most_accessed_picks_maximum() {
        let lines = [
            request("1.1.1.1", "/a", 200),
            request("1.1.1.1", "/b", 200),
            request("1.1.1.1", "/b", 200),
        ];
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let summary = analyze(&aggregates(&refs), 10);
        assert_eq!(summary.most_accessed_endpoint.unwrap().value, "/b");
    }

    #[test]
    fn login_example_is_flagged() {
        let mut lines = vec![request("203.0.113.5", "/login", 401); 11];
        lines.push(request("203.0.113.5", "/home", 200));
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let summary = analyze(&aggregates(&refs), 10);

        assert_eq!(summary.requests_per_ip[0].value, "203.0.113.5");
        assert_eq!(summary.requests_per_ip[0].count, 12);
        assert_eq!(summary.suspicious.len(), 1);
        assert_eq!(summary.suspicious[0].failed_logins, 11);
        let top = summary.most_accessed_endpoint.unwrap();
        assert_eq!((top.value.as_str(), top.count), ("/login", 11));
        assert_eq!(summary.total_requests, 12);
    }

    #[test]
    fn empty_aggregates_yield_empty_summary() {
        let summary = analyze(&LogAggregates::default(), 10);
        assert!(summary.requests_per_ip.is_empty());
        assert!(summary.most_accessed_endpoint.is_none());
        assert!(summary.suspicious.is_empty());
        assert_eq!(summary.total_requests, 0);
    }
}
