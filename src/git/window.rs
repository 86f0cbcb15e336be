use crate::git::parse::Tag;

/// Pick the two adjacent tags bounding a release window.
///
/// `tags` must already be ordered newest first. Without a target the window
/// is the two most recent tags; with a target it is the target and the tag
/// immediately older than it. Returns `None` when the target is unknown or
/// is the oldest tag in the listing.
pub fn select_window<'a>(tags: &'a [Tag], target: Option<&str>) -> Option<(&'a Tag, &'a Tag)> {
    let newer_index = match target {
        Some(name) => tags.iter().position(|tag| tag.name == name)?,
        None => 0,
    };

    let newer = tags.get(newer_index)?;
    let older = tags.get(newer_index + 1)?;

    Some((newer, older))
}
