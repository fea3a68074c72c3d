//! Autofs network map parsing (`/etc/auto.network`).
//!
//! Grammar, one entry per line:
//!
//! ```text
//! # comment
//! <name> <options> <uri>
//! ```
//!
//! Credentials inside `<options>` may contain escaped spaces (`\ `). Those
//! are masked before tokenizing so they never split a field and never reach
//! the output.

use tracing::debug;

/// A share entry before its host has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    pub name: String,
    /// "SMBv1.0", "SMBv3.0", "NFS" or "unknown"
    pub kind: String,
    /// "r/w" or "r/o"
    pub mode: String,
    pub path: String,
    pub host: String,
}

/// Replace escaped spaces with underscores.
pub fn mask_escaped_spaces(line: &str) -> String {
    line.replace("\\ ", "_")
}

/// Split a masked line into `[name, options, uri]`; any other token count
/// is rejected.
pub fn tokenize(line: &str) -> Option<[&str; 3]> {
    let mut tokens = line.split_whitespace();
    let fields = [tokens.next()?, tokens.next()?, tokens.next()?];
    if tokens.next().is_some() {
        return None;
    }
    Some(fields)
}

fn share_kind(options: &str) -> String {
    if options.contains("cifs") {
        // the kernel still defaults to SMB 1.0
        let mut kind = "SMBv1.0".to_string();
        for setting in options.split(',') {
            if let Some(version) = setting.strip_prefix("vers=") {
                kind = format!("SMBv{}", version);
            }
        }
        kind
    } else if options.contains("nfs") {
        "NFS".to_string()
    } else {
        "unknown".to_string()
    }
}

fn share_mode(options: &str) -> String {
    if options.split(',').any(|setting| setting == "ro") {
        "r/o".to_string()
    } else {
        "r/w".to_string()
    }
}

/// Host and path from a map URI: `host:/export` or `://host/share`.
fn split_uri(uri: &str) -> Option<(String, String)> {
    let first = uri.split(':').next().unwrap_or_default();
    if first.is_empty() {
        let host = uri.split('/').nth(2)?;
        Some((host.to_string(), uri.trim()[1..].to_string()))
    } else {
        Some((first.to_string(), uri.to_string()))
    }
}

/// Parse one map line; comments and malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<ShareEntry> {
    if line.starts_with('#') {
        return None;
    }
    let masked = mask_escaped_spaces(line);
    let [name, options, uri] = tokenize(&masked)?;
    let (host, path) = split_uri(uri)?;

    Some(ShareEntry {
        name: name.trim().to_string(),
        kind: share_kind(options),
        mode: share_mode(options),
        path,
        host,
    })
}

/// Parse a whole map, skipping comments and malformed lines.
pub fn parse_mount_table(text: &str) -> Vec<ShareEntry> {
    text.lines()
        .filter_map(|line| {
            let entry = parse_line(line);
            if entry.is_none() && !line.trim().is_empty() && !line.starts_with('#') {
                debug!(line = %mask_escaped_spaces(line), "skipping malformed mount map line");
            }
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_space_does_not_split_credentials() {
        let line = r"movies -fstype=cifs,user=john,pass=secret\ word,vers=3.0 ://nas/movies";
        let masked = mask_escaped_spaces(line);
        let tokens = tokenize(&masked).expect("three fields");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], "movies");
        assert_eq!(tokens[1], "-fstype=cifs,user=john,pass=secret_word,vers=3.0");
        assert_eq!(tokens[2], "://nas/movies");
    }

    #[test]
    fn test_cifs_share() {
        let entry = parse_line(r"movies -fstype=cifs,rw,user=a,pass=b\ c,vers=3.0 ://nas/movies").unwrap();
        assert_eq!(entry.name, "movies");
        assert_eq!(entry.kind, "SMBv3.0");
        assert_eq!(entry.mode, "r/w");
        assert_eq!(entry.host, "nas");
        assert_eq!(entry.path, "//nas/movies");
    }

    #[test]
    fn test_cifs_defaults_to_smb1() {
        let entry = parse_line("music -fstype=cifs,ro,guest ://192.168.1.5/music").unwrap();
        assert_eq!(entry.kind, "SMBv1.0");
        assert_eq!(entry.mode, "r/o");
        assert_eq!(entry.host, "192.168.1.5");
    }

    #[test]
    fn test_nfs_share() {
        let entry = parse_line("backup -fstype=nfs,rw,soft nas.local:/export/backup").unwrap();
        assert_eq!(entry.kind, "NFS");
        assert_eq!(entry.mode, "r/w");
        assert_eq!(entry.host, "nas.local");
        assert_eq!(entry.path, "nas.local:/export/backup");
    }

    #[test]
    fn test_unknown_transport() {
        let entry = parse_line("dav -fstype=davfs,rw :https\\://dav/x").unwrap();
        assert_eq!(entry.kind, "unknown");
    }

    #[test]
    fn test_comments_and_malformed_lines_are_skipped() {
        let table = "\
# network shares
movies -fstype=cifs,rw ://nas/movies

too few
too many fields on this line
odd -fstype=nfs :
backup -fstype=nfs,ro nas:/backup
";
        let entries = parse_mount_table(table);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "movies");
        assert_eq!(entries[1].name, "backup");
        assert_eq!(entries[1].mode, "r/o");
    }
}
