//! `/proc/net/route` parsing.

/// Default IPv4 gateway of `iface`.
///
/// Columns: Iface Destination Gateway Flags ...; addresses are little-endian
/// hex. The header line and malformed rows are skipped.
pub fn default_gateway(text: &str, iface: &str) -> Option<[u8; 4]> {
    text.lines().skip(1).find_map(|line| {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 || cols[0] != iface || cols[1] != "00000000" {
            return None;
        }
        let raw = u32::from_str_radix(cols[2], 16).ok()?;
        Some(raw.to_le_bytes())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTES: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t0001A8C0\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
eth0\t00000000\t0101A8C0\t0003\t0\t0\t0\t00000000\t0\t0\t0
wlan0\t0002A8C0\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
";

    #[test]
    fn test_default_gateway() {
        assert_eq!(default_gateway(ROUTES, "eth0"), Some([192, 168, 1, 1]));
    }

    #[test]
    fn test_no_default_route() {
        assert_eq!(default_gateway(ROUTES, "wlan0"), None);
        assert_eq!(default_gateway("", "eth0"), None);
    }
}
