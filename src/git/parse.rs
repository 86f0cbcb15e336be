use regex::Regex;

/// A named, dated release marker parsed from one line of tag-decorated
/// `git log` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub date: String,
}

/// A single commit inside the release window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Short, fixed-width commit identifier
    pub hash: String,
    /// ISO-8601 committer date
    pub date: String,
    /// Commit subject line
    pub message: String,
    /// Issue numbers referenced by the subject, in order of appearance,
    /// duplicates preserved
    pub issues: Vec<u64>,
}

/// Parse one line of `git log --tags --pretty=format:%cI %D` output.
///
/// The decoration part is a comma-separated ref list where tag refs carry a
/// `tag: ` prefix; a single line can decorate several co-located tags. Lines
/// without any matching tag ref yield an empty result rather than an error.
pub fn parse_tag_line(line: &str, tag_pattern: Option<&Regex>) -> Vec<Tag> {
    let Some((date, decoration)) = line.split_once(' ') else {
        return Vec::new();
    };

    if !looks_like_iso_date(date) {
        return Vec::new();
    }

    decoration
        .split(',')
        .filter_map(|entry| entry.trim().strip_prefix("tag: "))
        .filter(|name| tag_pattern.map_or(true, |pattern| pattern.is_match(name)))
        .map(|name| Tag {
            name: name.to_string(),
            date: date.to_string(),
        })
        .collect()
}

/// Parse a multi-line tag listing, flattening per-line results and dropping
/// lines that carried no matching tags.
pub fn parse_tags(text: &str, tag_pattern: Option<&Regex>) -> Vec<Tag> {
    text.lines()
        .flat_map(|line| parse_tag_line(line, tag_pattern))
        .collect()
}

/// Parse one line of `git log --pretty=format:%h %cI %s` output.
///
/// Returns `None` for lines that do not match the `<hash> <date> <subject>`
/// shape; malformed lines are tolerated as parser noise, not errors.
pub fn parse_commit_line(line: &str, issue_pattern: &Regex) -> Option<Commit> {
    let mut parts = line.splitn(3, ' ');
    let hash = parts.next()?;
    let date = parts.next()?;
    let message = parts.next()?;

    if !(7..=12).contains(&hash.len()) || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    if !looks_like_iso_date(date) {
        return None;
    }

    Some(Commit {
        hash: hash.to_string(),
        date: date.to_string(),
        message: message.to_string(),
        issues: extract_issue_numbers(message, issue_pattern),
    })
}

/// Collect every issue number referenced by `text`, left to right.
///
/// The pattern's second capture group must hold the number; capture text
/// that does not parse as an integer is skipped. Duplicates are preserved.
pub fn extract_issue_numbers(text: &str, issue_pattern: &Regex) -> Vec<u64> {
    issue_pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(2)?.as_str().parse().ok())
        .collect()
}

fn looks_like_iso_date(text: &str) -> bool {
    text.len() >= 10
        && text.as_bytes()[..4].iter().all(u8::is_ascii_digit)
        && text.as_bytes()[4] == b'-'
}
