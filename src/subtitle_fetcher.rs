/*!
 * Caption retrieval from YouTube.
 *
 * The fetcher scrapes the watch page for the innertube API key, asks the
 * innertube player endpoint for the caption track list, picks a track by
 * language priority and downloads its timed-text XML.
 */

use async_trait::async_trait;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use crate::errors::FetchError;
use crate::transcript::CaptionEntry;

const WATCH_URL: &str = "https://www.youtube.com/watch";
const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap()
});

static CONSENT_VALUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"name="v" value="(.*?)""#).unwrap()
});

static TEXT_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)"#).unwrap()
});

static ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\w+)="([^"]*)""#).unwrap()
});

static INLINE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static VIDEO_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{6,}$").unwrap());

/// Captions retrieved for one video
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    pub video_id: String,
    /// Video title, or a placeholder built from the ID
    pub title: String,
    pub language_code: String,
    /// Whether the track is automatic speech recognition output
    pub is_generated: bool,
    pub entries: Vec<CaptionEntry>,
}

/// One caption track offered for a video
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    pub name: String,
    pub is_generated: bool,
}

/// Source of captions for a video
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the best caption track for `video_id`.
    ///
    /// `languages` lists acceptable language codes, most preferred first.
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<FetchedTranscript, FetchError>;
}

/// Extract a video ID from a URL, or return the input when it already is one.
///
/// Handles `youtu.be/<id>`, `watch?v=<id>` and the `/shorts/`, `/embed/`,
/// `/live/` and `/v/` path forms.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let candidate = if input.contains("://") {
        input.to_string()
    } else if input.starts_with("youtu.be/")
        || input.starts_with("youtube.com/")
        || input.starts_with("www.youtube.com/")
        || input.starts_with("m.youtube.com/")
    {
        format!("https://{}", input)
    } else {
        return Some(input.to_string());
    };

    let Ok(url) = Url::parse(&candidate) else {
        return Some(input.to_string());
    };
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let mut segments = url.path_segments().into_iter().flatten().filter(|s| !s.is_empty());

    if host == "youtu.be" || host.ends_with(".youtu.be") {
        return segments.next().map(str::to_string);
    }

    if host.ends_with("youtube.com") || host.ends_with("youtube-nocookie.com") {
        if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
            if !v.is_empty() {
                return Some(v.into_owned());
            }
        }
        return match segments.next() {
            Some("shorts") | Some("embed") | Some("live") | Some("v") => {
                segments.next().map(str::to_string)
            }
            _ => None,
        };
    }

    Some(input.to_string())
}

/// Whether a string looks like a YouTube video ID
pub fn is_plausible_video_id(id: &str) -> bool {
    VIDEO_ID_REGEX.is_match(id)
}

/// Pick a caption track: generated tracks in priority order, then manual
/// tracks in priority order, then whatever is listed first.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    let find = |generated: bool| {
        languages.iter().find_map(|lang| {
            tracks.iter().find(|t| {
                t.is_generated == generated && t.language_code.eq_ignore_ascii_case(lang)
            })
        })
    };

    find(true).or_else(|| find(false)).or_else(|| tracks.first())
}

/// Parse YouTube timed-text XML into caption entries.
///
/// Self-closing elements and entries whose text is empty after decoding are
/// dropped. A missing `dur` attribute counts as zero.
pub fn parse_timedtext_xml(xml: &str) -> Result<Vec<CaptionEntry>, FetchError> {
    let mut entries = Vec::new();

    for caps in TEXT_ELEMENT_REGEX.captures_iter(xml) {
        let Some(body) = caps.get(2) else {
            continue;
        };
        let attributes = &caps[1];
        let mut start = None;
        let mut duration = 0.0;

        for attr in ATTRIBUTE_REGEX.captures_iter(attributes) {
            match &attr[1] {
                "start" => {
                    start = Some(attr[2].parse::<f64>().map_err(|e| {
                        FetchError::Parse(format!("Invalid start time '{}': {}", &attr[2], e))
                    })?);
                }
                "dur" => {
                    duration = attr[2].parse::<f64>().map_err(|e| {
                        FetchError::Parse(format!("Invalid duration '{}': {}", &attr[2], e))
                    })?;
                }
                _ => {}
            }
        }

        let start = start.ok_or_else(|| FetchError::Parse("Caption without start time".to_string()))?;

        // Text is escaped twice in some tracks, so tags show up only after decoding
        let decoded = decode_html_entities(body.as_str());
        let stripped = INLINE_TAG_REGEX.replace_all(&decoded, "");
        let entry = CaptionEntry::new(decode_html_entities(&stripped), start, duration);

        if !entry.text.is_empty() {
            entries.push(entry);
        }
    }

    Ok(entries)
}

/// Decode the HTML entities YouTube uses in caption text
pub fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
                _ => None,
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    video_details: Option<VideoDetails>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayabilityStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<TrackName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    #[serde(default)]
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl From<RawCaptionTrack> for CaptionTrack {
    fn from(raw: RawCaptionTrack) -> Self {
        let name = raw
            .name
            .map(|n| {
                n.simple_text
                    .unwrap_or_else(|| n.runs.into_iter().map(|r| r.text).collect())
            })
            .unwrap_or_default();

        CaptionTrack {
            base_url: raw.base_url.replace("&fmt=srv3", ""),
            language_code: raw.language_code,
            name,
            is_generated: raw.kind.as_deref() == Some("asr"),
        }
    }
}

/// Caption source backed by YouTube's web and innertube endpoints
pub struct YouTubeFetcher {
    /// HTTP client for all requests
    client: Client,
}

impl YouTubeFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn get_text(&self, url: &str, cookie: Option<&str>) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(header::ACCEPT_LANGUAGE, "en-US");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("GET {} returned {}", url, status)));
        }

        Ok(response.text().await?)
    }

    /// Fetch the watch page, answering the cookie consent form if shown
    async fn fetch_watch_html(&self, video_id: &str) -> Result<String, FetchError> {
        let url = format!("{}?v={}", WATCH_URL, video_id);
        let html = self.get_text(&url, None).await?;

        if !html.contains("action=\"https://consent.youtube.com/s\"") {
            return Ok(html);
        }

        debug!("Answering cookie consent page");
        let token = CONSENT_VALUE_REGEX
            .captures(&html)
            .map(|c| c[1].to_string())
            .ok_or_else(|| FetchError::Network("Failed to accept the cookie consent page".to_string()))?;
        let cookie = format!("CONSENT=YES+{}", token);
        let html = self.get_text(&url, Some(&cookie)).await?;

        if html.contains("action=\"https://consent.youtube.com/s\"") {
            return Err(FetchError::Network("Cookie consent was not accepted".to_string()));
        }

        Ok(html)
    }

    fn extract_api_key(html: &str) -> Result<String, FetchError> {
        if let Some(caps) = API_KEY_REGEX.captures(html) {
            return Ok(caps[1].to_string());
        }
        if html.contains("class=\"g-recaptcha\"") {
            return Err(FetchError::Network(
                "YouTube is blocking requests from this IP (captcha required)".to_string(),
            ));
        }

        Err(FetchError::Parse("Innertube API key not found in the watch page".to_string()))
    }

    async fn fetch_player_response(&self, video_id: &str, api_key: &str) -> Result<PlayerResponse, FetchError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("Innertube player request returned {}", status)));
        }

        response
            .json::<PlayerResponse>()
            .await
            .map_err(|e| FetchError::Parse(format!("Invalid innertube player response: {}", e)))
    }

    /// List the caption tracks offered for a video, with its title
    pub async fn list_tracks(&self, video_id: &str) -> Result<(Vec<CaptionTrack>, Option<String>), FetchError> {
        let html = self.fetch_watch_html(video_id).await?;
        let api_key = Self::extract_api_key(&html)?;
        let player = self.fetch_player_response(video_id, &api_key).await?;

        tracks_from_player(video_id, player)
    }
}

impl Default for YouTubeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn tracks_from_player(
    video_id: &str,
    player: PlayerResponse,
) -> Result<(Vec<CaptionTrack>, Option<String>), FetchError> {
    if let Some(status) = &player.playability_status {
        if status.status != "OK" && !status.status.is_empty() {
            return Err(FetchError::VideoUnavailable {
                video_id: video_id.to_string(),
                reason: status.reason.clone().unwrap_or_else(|| status.status.clone()),
            });
        }
    }

    let title = player
        .video_details
        .and_then(|d| d.title)
        .filter(|t| !t.trim().is_empty());

    let tracks: Vec<CaptionTrack> = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .map(|r| r.caption_tracks.into_iter().map(CaptionTrack::from).collect())
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(FetchError::NotFound {
            video_id: video_id.to_string(),
            reason: "captions are disabled for this video".to_string(),
        });
    }

    Ok((tracks, title))
}

#[async_trait]
impl CaptionSource for YouTubeFetcher {
    async fn fetch(&self, video_id: &str, languages: &[String]) -> Result<FetchedTranscript, FetchError> {
        let (tracks, title) = self.list_tracks(video_id).await?;
        debug!(
            "Available caption tracks: {}",
            tracks
                .iter()
                .map(|t| format!("{}{}", t.language_code, if t.is_generated { " (auto)" } else { "" }))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let track = select_track(&tracks, languages).ok_or_else(|| FetchError::NotFound {
            video_id: video_id.to_string(),
            reason: "no caption track available".to_string(),
        })?;

        if !languages.iter().any(|l| l.eq_ignore_ascii_case(&track.language_code)) {
            warn!(
                "No caption track in {}, falling back to '{}'",
                languages.join(", "),
                track.language_code
            );
        }
        info!(
            "Using {} caption track '{}' ({})",
            if track.is_generated { "generated" } else { "manual" },
            track.name,
            track.language_code
        );

        let xml = self.get_text(&track.base_url, None).await?;
        let entries = parse_timedtext_xml(&xml)?;

        if entries.is_empty() {
            return Err(FetchError::NotFound {
                video_id: video_id.to_string(),
                reason: format!("caption track '{}' is empty", track.language_code),
            });
        }

        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            title: title.unwrap_or_else(|| default_title(video_id)),
            language_code: track.language_code.clone(),
            is_generated: track.is_generated,
            entries,
        })
    }
}

/// Title used when the platform does not report one
pub fn default_title(video_id: &str) -> String {
    format!("YouTube Video {}", video_id)
}
