use std::collections::BTreeMap;
use std::path::Path;

/// Bucket for files whose name carries no extension.
pub const NO_EXTENSION: &str = "(none)";

const FILE_HEADER: &str = "diff --git ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub additions: usize,
    pub deletions: usize,
}

impl FileChange {
    pub fn touched(&self) -> usize {
        self.additions + self.deletions
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub files_changed: usize,
    pub additions: usize,
    pub deletions: usize,
    pub language_breakdown: BTreeMap<String, usize>,
    pub files: Vec<FileChange>,
}

impl DiffStat {
    pub fn parse(diff: &str) -> Self {
        let mut stat = DiffStat::default();
        let mut current: Option<FileChange> = None;
        let mut old_path: Option<String> = None;
        let mut in_hunk = false;

        for line in diff.lines() {
            if let Some(header) = line.strip_prefix(FILE_HEADER) {
                if let Some(file) = current.take() {
                    stat.record(file);
                }
                current = Some(FileChange {
                    path: path_from_header(header),
                    additions: 0,
                    deletions: 0,
                });
                old_path = None;
                in_hunk = false;
                continue;
            }

            let Some(file) = current.as_mut() else {
                continue;
            };

            if line.starts_with("@@") {
                in_hunk = true;
            } else if in_hunk {
                if line.starts_with('+') {
                    file.additions += 1;
                } else if line.starts_with('-') {
                    file.deletions += 1;
                }
            } else if let Some(name) = line.strip_prefix("--- ") {
                old_path = marker_path(name, "a/");
            } else if let Some(name) = line.strip_prefix("+++ ") {
                // Deleted files only name themselves on the `---` line.
                if let Some(path) = marker_path(name, "b/").or_else(|| old_path.take()) {
                    file.path = path;
                }
            }
        }

        if let Some(file) = current.take() {
            stat.record(file);
        }
        stat
    }

    /// Extensions ordered by touched lines, largest first.
    pub fn top_extensions(&self, limit: usize) -> Vec<&str> {
        let mut entries: Vec<(&str, usize)> = self
            .language_breakdown
            .iter()
            .filter(|(ext, _)| ext.as_str() != NO_EXTENSION)
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries.into_iter().take(limit).map(|(ext, _)| ext).collect()
    }

    /// Files ordered by touched lines, largest first.
    pub fn key_files(&self, limit: usize) -> Vec<&FileChange> {
        let mut files: Vec<&FileChange> = self.files.iter().collect();
        files.sort_by(|a, b| b.touched().cmp(&a.touched()));
        files.truncate(limit);
        files
    }

    fn record(&mut self, file: FileChange) {
        self.files_changed += 1;
        self.additions += file.additions;
        self.deletions += file.deletions;
        *self
            .language_breakdown
            .entry(extension_key(&file.path))
            .or_insert(0) += file.touched();
        self.files.push(file);
    }
}

/// Path named by a `---`/`+++` line, `None` for `/dev/null`.
fn marker_path(name: &str, prefix: &str) -> Option<String> {
    let name = name.split('\t').next().unwrap_or(name);
    if name == "/dev/null" {
        return None;
    }
    let path = unquote(name);
    Some(path.strip_prefix(prefix).map(str::to_string).unwrap_or(path))
}

/// Fallback for sections without `---`/`+++` lines (binary files, pure renames).
fn path_from_header(header: &str) -> String {
    if header.ends_with('"') {
        if let Some((_, last)) = header.rsplit_once(" \"") {
            let path = unquote(&format!("\"{last}"));
            return path.strip_prefix("b/").map(str::to_string).unwrap_or(path);
        }
    }
    // `a/<path> b/<path>`: both halves match unless the file was renamed.
    let half = header.len().saturating_sub(1) / 2;
    if header.as_bytes().get(half) == Some(&b' ') {
        let (old, new) = (&header[..half], &header[half + 1..]);
        if let (Some(old), Some(new)) = (old.strip_prefix("a/"), new.strip_prefix("b/")) {
            if old == new {
                return new.to_string();
            }
        }
    }
    match header.rfind(" b/") {
        Some(idx) => header[idx + 3..].to_string(),
        None => header.trim_start_matches("a/").to_string(),
    }
}

/// Decodes git's C-style quoting, including octal byte escapes.
fn unquote(name: &str) -> String {
    let Some(inner) = name.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return name.to_string();
    };
    let mut bytes = Vec::with_capacity(inner.len());
    let mut escaped = inner.bytes().peekable();
    while let Some(byte) = escaped.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        match escaped.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(b'a') => bytes.push(0x07),
            Some(b'b') => bytes.push(0x08),
            Some(b'f') => bytes.push(0x0c),
            Some(b'v') => bytes.push(0x0b),
            Some(digit @ b'0'..=b'7') => {
                let mut value = u32::from(digit - b'0');
                for _ in 0..2 {
                    match escaped.peek() {
                        Some(&next) if (b'0'..=b'7').contains(&next) => {
                            value = value * 8 + u32::from(next - b'0');
                            escaped.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(value as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

fn extension_key(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| NO_EXTENSION.to_string())
}
