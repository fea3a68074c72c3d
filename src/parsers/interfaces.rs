//! `/etc/network/interfaces` method detection.

/// `iface` stanzas mentioning `iface` with the given family keyword.
fn iface_lines<'a>(config: &'a str, iface: &'a str, family: &'a str) -> impl Iterator<Item = &'a str> {
    config.lines().filter(move |line| {
        !line.starts_with('#') && line.starts_with("iface") && line.contains(family) && line.contains(iface)
    })
}

/// IPv4 configuration method; "static" unless the config says otherwise.
pub fn ipv4_method(config: &str, iface: &str) -> String {
    let mut method = "static";
    for line in iface_lines(config, iface, "inet ") {
        if line.contains("static") {
            method = "static";
        }
        if line.contains("dhcp") {
            method = "DHCP";
        }
        if line.contains("manual") {
            method = "manual/disabled";
        }
    }
    method.to_string()
}

/// IPv6 configuration method; "SLAAC" unless the config says otherwise.
pub fn ipv6_method(config: &str, iface: &str) -> String {
    let mut method = "SLAAC";
    for line in iface_lines(config, iface, "inet6") {
        if line.contains("static") {
            method = "static";
        }
        if line.contains("dhcp") {
            method = "DHCP";
        }
        if line.contains("manual") {
            method = "manual/disabled";
        }
        if line.contains("6to4") {
            method = "6to4";
        }
    }
    method.to_string()
}

/// Whether the IPv4 side of `iface` is configured by DHCP.
pub fn uses_dhcp(config: &str, iface: &str) -> bool {
    ipv4_method(config, iface) == "DHCP"
}
