//! Pure matching rules shared by the engine and its tests.

use crate::searcher::TorrentCandidate;
use crate::subtitles::SubtitleCandidate;

/// How well a subtitle package fits a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Resolution, quality and group all match.
    Perfect,
    /// Two of the three attributes match.
    Partial,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Perfect => "perfect",
            MatchKind::Partial => "partial",
        }
    }
}

/// Result of cross-matching torrents against subtitle packages.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMatch {
    pub candidate: TorrentCandidate,
    pub kind: MatchKind,
}

/// Which release attributes of a torrent a subtitle package covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeHits {
    pub resolution: bool,
    pub quality: bool,
    pub group: bool,
}

impl AttributeHits {
    pub fn count(&self) -> usize {
        [self.resolution, self.quality, self.group]
            .iter()
            .filter(|hit| **hit)
            .count()
    }

    pub fn kind(&self) -> Option<MatchKind> {
        match self.count() {
            3 => Some(MatchKind::Perfect),
            2 => Some(MatchKind::Partial),
            _ => None,
        }
    }
}

/// Extension of the last path element, including the dot.
fn file_extension(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.rfind('.').map(|idx| &base[idx..])
}

/// Whether the file name ends in one of the subtitle extensions (case-sensitive).
pub fn has_subtitle_extension(name: &str, extensions: &[String]) -> bool {
    match file_extension(name) {
        Some(ext) => extensions.iter().any(|e| e == ext),
        None => false,
    }
}

/// Whether the raw file name contains one of the language hints.
pub fn has_language_hint(name: &str, hints: &[String]) -> bool {
    hints
        .iter()
        .any(|hint| !hint.is_empty() && name.contains(hint.as_str()))
}

/// Whether a subtitle group tag refers to the torrent's release group.
pub fn group_matches(subtitle_group: &str, torrent_group: &str) -> bool {
    if !subtitle_group.is_empty() && subtitle_group == torrent_group {
        return true;
    }
    // YIFY releases are distributed under the "yts" tag
    if subtitle_group.eq_ignore_ascii_case("yify") && torrent_group.eq_ignore_ascii_case("yts") {
        return true;
    }
    !torrent_group.is_empty()
        && subtitle_group
            .to_lowercase()
            .contains(&torrent_group.to_lowercase())
}

fn contains_non_empty(values: &[String], wanted: &str) -> bool {
    !wanted.is_empty() && values.iter().any(|v| v == wanted)
}

/// Compare one torrent against one subtitle package.
pub fn attribute_hits(torrent: &TorrentCandidate, subtitle: &SubtitleCandidate) -> AttributeHits {
    AttributeHits {
        resolution: contains_non_empty(&subtitle.resolution, &torrent.resolution),
        quality: contains_non_empty(&subtitle.quality, &torrent.quality),
        group: subtitle
            .group
            .iter()
            .any(|g| group_matches(g, &torrent.group)),
    }
}

/// First torrent, in search order, with a perfect or partial subtitle match.
///
/// The scan stops at the first hit of either kind; a later perfect match
/// does not beat an earlier partial one.
pub fn cross_match(
    torrents: &[TorrentCandidate],
    subtitles: &[SubtitleCandidate],
) -> Option<CrossMatch> {
    torrents.iter().find_map(|torrent| {
        subtitles.iter().find_map(|subtitle| {
            attribute_hits(torrent, subtitle).kind().map(|kind| CrossMatch {
                candidate: torrent.clone(),
                kind,
            })
        })
    })
}
