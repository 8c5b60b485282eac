use crate::api::ContentResolver;
use crate::core::ContentId;
use reqwest::Url;

const VIDEO_ID_LEN: usize = 11;

/// Resolves YouTube video ids from player paths
///
/// Understands:
/// - Kodi plugin paths (`plugin://plugin.video.youtube/play/?video_id=ID`)
/// - watch URLs (`https://www.youtube.com/watch?v=ID`)
/// - short and embed links (`https://youtu.be/ID`, `/embed/ID`)
#[derive(Debug, Clone, Default)]
pub struct YoutubeResolver;

impl YoutubeResolver {
    pub fn new() -> Self {
        Self
    }

    fn is_video_id(candidate: &str) -> bool {
        candidate.len() == VIDEO_ID_LEN
            && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    fn from_url(url: &Url) -> Option<String> {
        if let Some((_, value)) = url
            .query_pairs()
            .find(|(key, _)| key == "video_id" || key == "v" || key == "videoid")
        {
            return Some(value.into_owned());
        }

        let host = url.host_str().unwrap_or_default();
        let mut segments = url.path_segments()?;
        if host == "youtu.be" {
            return segments.next().map(str::to_string);
        }

        // /embed/ID, /shorts/ID, /live/ID
        while let Some(segment) = segments.next() {
            if matches!(segment, "embed" | "shorts" | "live") {
                return segments.next().map(str::to_string);
            }
        }
        None
    }
}

impl ContentResolver for YoutubeResolver {
    fn resolve(&self, file_path: &str) -> Option<ContentId> {
        let trimmed = file_path.trim();
        if Self::is_video_id(trimmed) {
            return Some(ContentId(trimmed.to_string()));
        }

        let url = Url::parse(trimmed).ok()?;
        Self::from_url(&url)
            .filter(|id| Self::is_video_id(id))
            .map(ContentId)
    }
}
