//! `/proc/bus/nim_sockets` parsing.
//!
//! ```text
//! NIM Socket 0:
//!     Type: DVB-S2
//!     Name: BCM4506 (internal)
//! NIM Socket 1:
//!     Type: DVB-C
//!     Name: Si2169C
//! ```

use crate::status::traits::TunerSlot;

/// "Tuner A", "Tuner B", ...
pub fn slot_name(slot: usize) -> String {
    match u8::try_from(slot).ok().filter(|s| *s < 26) {
        Some(offset) => format!("Tuner {}", char::from(b'A' + offset)),
        None => format!("Tuner {}", slot + 1),
    }
}

/// One [`TunerSlot`] per socket block; sockets without a type are empty slots.
pub fn parse_nim_sockets(text: &str) -> Vec<TunerSlot> {
    let mut slots: Vec<TunerSlot> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix("NIM Socket ") {
            let Ok(slot) = header.trim_end_matches(':').trim().parse::<usize>() else {
                continue;
            };
            slots.push(TunerSlot {
                slot,
                slot_name: slot_name(slot),
                nim_name: "empty".to_string(),
                friendly_type: "not available".to_string(),
            });
            continue;
        }
        let (Some(current), Some((key, value))) = (slots.last_mut(), line.split_once(':')) else {
            continue;
        };
        match key.trim() {
            "Type" => current.friendly_type = value.trim().to_string(),
            "Name" => current.nim_name = value.trim().to_string(),
            _ => {}
        }
    }
    slots
}
