//! `/proc/cpuinfo` parsing.

/// The few identity fields the snapshot needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuIdentity {
    /// "model name" (x86, most ARM kernels) or "cpu model" (MIPS)
    pub brand: Option<String>,
    /// "Hardware" (ARM SoC) or "system type" (MIPS), i.e. the chipset
    pub hardware: Option<String>,
    pub architecture: Option<String>,
}

pub fn parse_cpuinfo(text: &str) -> CpuIdentity {
    let mut identity = CpuIdentity::default();

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "model name" | "cpu model" if identity.brand.is_none() => {
                identity.brand = Some(value.to_string())
            }
            "Hardware" | "system type" if identity.hardware.is_none() => {
                identity.hardware = Some(value.to_string())
            }
            "architecture" | "CPU architecture" if identity.architecture.is_none() => {
                identity.architecture = Some(value.to_string())
            }
            _ => {}
        }
    }

    if identity.architecture.is_none() {
        identity.architecture = guess_architecture(text);
    }
    identity
}

fn guess_architecture(text: &str) -> Option<String> {
    if text.contains("aarch64") || text.contains("ARMv8") {
        Some("aarch64".to_string())
    } else if text.contains("ARMv7") || text.contains("arm") {
        Some("arm".to_string())
    } else if text.contains("mips") || text.contains("MIPS") {
        Some("mips".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_box() {
        let text = "processor\t: 0\nmodel name\t: ARMv7 Processor rev 1 (v7l)\n\
                    BogoMIPS\t: 1993.93\nCPU architecture: 7\n\nHardware\t: BCM7251s\n";
        let identity = parse_cpuinfo(text);
        assert_eq!(identity.brand.as_deref(), Some("ARMv7 Processor rev 1 (v7l)"));
        assert_eq!(identity.hardware.as_deref(), Some("BCM7251s"));
        assert_eq!(identity.architecture.as_deref(), Some("7"));
    }

    #[test]
    fn test_mips_box() {
        let text = "system type\t\t: BCM7362\nprocessor\t\t: 0\ncpu model\t\t: Broadcom BMIPS4380 V7.1\n";
        let identity = parse_cpuinfo(text);
        assert_eq!(identity.brand.as_deref(), Some("Broadcom BMIPS4380 V7.1"));
        assert_eq!(identity.hardware.as_deref(), Some("BCM7362"));
        assert_eq!(identity.architecture.as_deref(), Some("mips"));
    }

    #[test]
    fn test_first_value_wins() {
        let text = "model name: first\nmodel name: second\n";
        assert_eq!(parse_cpuinfo(text).brand.as_deref(), Some("first"));
    }
}
