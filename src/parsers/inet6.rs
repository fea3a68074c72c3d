//! `/proc/net/if_inet6` parsing.

use crate::status::format::normalize_ipv6;
use tracing::debug;

/// Shown when the kernel has no IPv6 support.
pub const IPV4_ONLY_KERNEL: &str = "IPv4-only kernel";
/// Shown when the interface has no global IPv6 address.
pub const IPV4_ONLY_NETWORK: &str = "none/IPv4-only network";

/// IPv6 facts for one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Summary {
    /// Addresses joined by ", " (sorted), or a status text
    pub addresses: String,
    /// First address in the global unicast range (2000::/3), without prefix
    pub first_public: Option<String>,
}

/// Collect the non-link-local addresses of `iface` in a single pass.
///
/// Columns: address (32 hex digits), index, prefix length (hex), scope,
/// flags, interface name. A prefix of `ff` means "none".
pub fn ipv6_summary(table: Option<&str>, iface: &str) -> Ipv6Summary {
    let Some(table) = table else {
        return Ipv6Summary {
            addresses: IPV4_ONLY_KERNEL.to_string(),
            first_public: None,
        };
    };

    let mut first_public = None;
    let mut addresses = Vec::new();

    for line in table.lines() {
        if line.starts_with("fe80") {
            continue;
        }
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 6 || cols[5] != iface {
            continue;
        }
        let hex = cols[0];
        if hex.len() != 32 || !hex.is_ascii() {
            debug!(line, "skipping malformed if_inet6 line");
            continue;
        }
        let grouped = hex
            .as_bytes()
            .chunks(4)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
            .collect::<Vec<_>>()
            .join(":");

        if first_public.is_none() && (grouped.starts_with('2') || grouped.starts_with('3')) {
            first_public = normalize_ipv6(&grouped).ok();
        }

        let prefix = cols[2].to_ascii_lowercase();
        let with_prefix = if prefix == "ff" {
            grouped
        } else {
            match u32::from_str_radix(&prefix, 16) {
                Ok(len) => format!("{}/{}", grouped, len),
                Err(_) => {
                    debug!(line, "skipping if_inet6 line with bad prefix");
                    continue;
                }
            }
        };

        match normalize_ipv6(&with_prefix) {
            Ok(addr) => addresses.push(addr),
            Err(err) => debug!(error = %err, "skipping unparsable IPv6 address"),
        }
    }

    let addresses = match addresses.len() {
        0 => IPV4_ONLY_NETWORK.to_string(),
        1 => addresses.remove(0),
        _ => {
            addresses.sort();
            addresses.join(", ")
        }
    };

    Ipv6Summary {
        addresses,
        first_public,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
fe80000000000000020000fffe000001 02 40 20 80     eth0
20010db8000000000000000000000001 02 40 00 00     eth0
20010db8000000000000000000000002 02 80 00 00     eth0
fd000000000000000000000000000005 02 40 00 00     eth0
00000000000000000000000000000001 01 80 10 80       lo
20010db8000000000000000000000009 03 40 00 00    wlan0
";

    #[test]
    fn test_multiple_addresses_sorted_and_joined() {
        let summary = ipv6_summary(Some(TABLE), "eth0");
        assert_eq!(
            summary.addresses,
            "2001:db8::1/64, 2001:db8::2, fd00::5/64"
        );
        assert_eq!(summary.first_public.as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn test_single_address() {
        let summary = ipv6_summary(Some(TABLE), "wlan0");
        assert_eq!(summary.addresses, "2001:db8::9/64");
        assert_eq!(summary.first_public.as_deref(), Some("2001:db8::9"));
    }

    #[test]
    fn test_loopback_has_no_public_address() {
        let summary = ipv6_summary(Some(TABLE), "lo");
        assert_eq!(summary.addresses, "::1");
        assert_eq!(summary.first_public, None);
    }

    #[test]
    fn test_interface_without_addresses() {
        let summary = ipv6_summary(Some(TABLE), "eth1");
        assert_eq!(summary.addresses, IPV4_ONLY_NETWORK);
        assert_eq!(summary.first_public, None);
    }

    #[test]
    fn test_ipv4_only_kernel() {
        let summary = ipv6_summary(None, "eth0");
        assert_eq!(summary.addresses, IPV4_ONLY_KERNEL);
    }

    #[test]
    fn test_short_and_ff_prefix_lines() {
        let table = "2001 02 40\n20010db80000000000000000000000aa 02 ff 00 00 eth0\n";
        let summary = ipv6_summary(Some(table), "eth0");
        assert_eq!(summary.addresses, "2001:db8::aa");
    }
}
