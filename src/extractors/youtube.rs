use crate::config::Config;
use crate::core::metadata::normalize_upload_date;
use crate::core::{ChannelRef, Extractor, FetchError, VideoDetails};
use crate::utils::{extract_json_after, find_key, parse_count, text_of};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

const COMMENTS_PANEL_ID: &str = "engagement-panel-comments-section";

/// Key and client version the page uses for its own innertube calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnertubeConfig {
    pub api_key: String,
    pub client_version: String,
}

impl InnertubeConfig {
    pub fn from_html(html: &str) -> Option<Self> {
        let api_key = Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#)
            .ok()?
            .captures(html)?
            .get(1)?
            .as_str()
            .to_string();
        let client_version = Regex::new(r#""INNERTUBE_CLIENT_VERSION"\s*:\s*"([^"]+)""#)
            .ok()
            .and_then(|re| re.captures(html))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "2.20240808.00.00".to_string());

        Some(Self {
            api_key,
            client_version,
        })
    }
}

/// Video ids and the next continuation token found in one page of a listing.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub video_ids: Vec<String>,
    pub continuation: Option<String>,
}

impl ListingPage {
    /// Walks grid items in document order.
    pub fn collect(&mut self, value: &Value) {
        match value {
            Value::Object(map) => {
                for key in ["videoRenderer", "gridVideoRenderer"] {
                    if let Some(id) = map.get(key).and_then(|r| r.get("videoId")).and_then(|v| v.as_str()) {
                        self.video_ids.push(id.to_string());
                        return;
                    }
                }
                if let Some(lockup) = map.get("lockupViewModel") {
                    let is_video = lockup
                        .get("contentType")
                        .and_then(|v| v.as_str())
                        .map_or(true, |t| t == "LOCKUP_CONTENT_TYPE_VIDEO");
                    if let Some(id) = lockup.get("contentId").and_then(|v| v.as_str()) {
                        if is_video {
                            self.video_ids.push(id.to_string());
                        }
                        return;
                    }
                }
                if let Some(renderer) = map.get("continuationItemRenderer") {
                    if let Some(token) = renderer
                        .pointer("/continuationEndpoint/continuationCommand/token")
                        .and_then(|v| v.as_str())
                    {
                        self.continuation = Some(token.to_string());
                    }
                    return;
                }
                for child in map.values() {
                    self.collect(child);
                }
            }
            Value::Array(items) => items.iter().for_each(|item| self.collect(item)),
            _ => {}
        }
    }

    /// First page: the content of the selected tab of a channel page.
    pub fn from_initial_data(initial_data: &Value) -> Option<Self> {
        let tabs = initial_data
            .pointer("/contents/twoColumnBrowseResultsRenderer/tabs")?
            .as_array()?;
        let content = tabs.iter().find_map(|tab| {
            let renderer = tab.get("tabRenderer")?;
            let selected = renderer.get("selected").and_then(|v| v.as_bool()).unwrap_or(false);
            selected.then(|| renderer.get("content")).flatten()
        })?;

        let mut page = Self::default();
        page.collect(content);
        Some(page)
    }

    /// Later pages: the `appendContinuationItemsAction`s of a browse response.
    pub fn from_continuation(response: &Value) -> Self {
        let mut page = Self::default();
        let actions = response
            .get("onResponseReceivedActions")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten();
        for action in actions {
            if let Some(items) = action.pointer("/appendContinuationItemsAction/continuationItems") {
                page.collect(items);
            }
        }
        page
    }
}

pub struct YouTubeExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl YouTubeExtractor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: YOUTUBE_BASE_URL.to_string(),
        })
    }

    /// Points the extractor at another host, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_html(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?
            .error_for_status()?;

        let html = response.text().await?;
        if html.is_empty() {
            return Err(FetchError::Extraction("empty response from YouTube".to_string()));
        }
        Ok(html)
    }

    async fn browse_continuation(&self, innertube: &InnertubeConfig, token: &str) -> Result<Value> {
        let url = format!("{}/youtubei/v1/browse", self.base_url);
        let body = json!({
            "context": {
                "client": {
                    "clientName": "WEB",
                    "clientVersion": innertube.client_version,
                    "hl": "en",
                }
            },
            "continuation": token,
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", innertube.api_key.as_str()), ("prettyPrint", "false")])
            .json(&body)
            .send()
            .await
            .context("Failed to send browse request")?
            .error_for_status()
            .context("Browse request failed")?;

        response
            .json()
            .await
            .context("Failed to decode browse continuation response")
    }

    /// Reads title, views, upload date and comment count out of a watch page.
    pub fn parse_watch_page(html: &str) -> Result<VideoDetails, FetchError> {
        let player_response = extract_json_after(html, "ytInitialPlayerResponse").ok_or_else(|| {
            FetchError::Extraction("could not find ytInitialPlayerResponse".to_string())
        })?;

        let Some(video_details) = player_response.get("videoDetails") else {
            let reason = player_response
                .pointer("/playabilityStatus/reason")
                .and_then(|v| v.as_str())
                .or_else(|| {
                    player_response
                        .pointer("/playabilityStatus/status")
                        .and_then(|v| v.as_str())
                })
                .unwrap_or("no video details");
            return Err(FetchError::Unavailable(reason.to_string()));
        };

        let title = video_details
            .get("title")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        let view_count = video_details
            .get("viewCount")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<u64>().ok());

        let microformat = player_response.pointer("/microformat/playerMicroformatRenderer");
        let upload_date = microformat
            .and_then(|m| m.get("uploadDate").or_else(|| m.get("publishDate")))
            .and_then(|v| v.as_str())
            .and_then(normalize_upload_date);

        let comment_count = extract_json_after(html, "ytInitialData")
            .as_ref()
            .and_then(Self::parse_comment_count);

        Ok(VideoDetails {
            title,
            view_count,
            upload_date,
            comment_count,
        })
    }

    /// Comment count shown in the header of the comments engagement panel.
    pub fn parse_comment_count(initial_data: &Value) -> Option<u64> {
        let from_panel = initial_data
            .get("engagementPanels")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|panel| panel.get("engagementPanelSectionListRenderer"))
            .find(|renderer| {
                renderer.get("panelIdentifier").and_then(|v| v.as_str()) == Some(COMMENTS_PANEL_ID)
                    || renderer.get("targetId").and_then(|v| v.as_str()) == Some(COMMENTS_PANEL_ID)
            })
            .and_then(|renderer| {
                renderer.pointer("/header/engagementPanelTitleHeaderRenderer/contextualInfo")
            })
            .and_then(text_of)
            .and_then(|text| parse_count(&text));

        from_panel.or_else(|| {
            let header = find_key(initial_data, "commentsEntryPointHeaderRenderer")?;
            let text = header.get("commentCount").and_then(text_of)?;
            parse_count(&text)
        })
    }
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn name(&self) -> &'static str {
        "YouTube"
    }

    async fn list_channel(&self, channel: &ChannelRef) -> Result<Vec<String>> {
        let url = channel.videos_url(&self.base_url);
        let html = self
            .get_html(&url, &[("hl", "en")])
            .await
            .with_context(|| format!("Failed to fetch channel page {}", url))?;

        let initial_data = extract_json_after(&html, "ytInitialData")
            .context("Could not find ytInitialData in channel page")?;
        let first = ListingPage::from_initial_data(&initial_data)
            .context("Channel page has no selected videos tab")?;
        debug!("First listing page: {} videos", first.video_ids.len());

        let mut video_ids = first.video_ids;
        let mut next = first.continuation;
        let mut seen_tokens = HashSet::new();
        let innertube = InnertubeConfig::from_html(&html);

        while let Some(token) = next.take() {
            if !seen_tokens.insert(token.clone()) {
                warn!("Continuation token repeated, stopping listing");
                break;
            }
            let innertube = innertube
                .as_ref()
                .context("Listing continues but the page has no INNERTUBE_API_KEY")?;

            let response = self.browse_continuation(innertube, &token).await?;
            let page = ListingPage::from_continuation(&response);
            debug!(
                "Continuation page: {} videos, more: {}",
                page.video_ids.len(),
                page.continuation.is_some()
            );
            video_ids.extend(page.video_ids);
            next = page.continuation;
        }

        Ok(video_ids)
    }

    async fn fetch_video(&self, video_id: &str) -> Result<VideoDetails, FetchError> {
        let url = format!("{}/watch", self.base_url);
        let html = self.get_html(&url, &[("v", video_id), ("hl", "en")]).await?;
        Self::parse_watch_page(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch_page(player: &Value, initial: &Value) -> String {
        format!(
            "<html><script>var ytInitialPlayerResponse = {};var meta = 1;</script>\
             <script>var ytInitialData = {};</script></html>",
            player, initial
        )
    }

    #[test]
    fn test_parse_watch_page() {
        let player = json!({
            "videoDetails": {"videoId": "abc", "title": "Hello world", "viewCount": "12345"},
            "microformat": {"playerMicroformatRenderer": {"uploadDate": "2021-03-05T10:00:00-07:00"}}
        });
        let initial = json!({
            "engagementPanels": [
                {"engagementPanelSectionListRenderer": {"panelIdentifier": "other"}},
                {"engagementPanelSectionListRenderer": {
                    "panelIdentifier": "engagement-panel-comments-section",
                    "header": {"engagementPanelTitleHeaderRenderer": {
                        "contextualInfo": {"runs": [{"text": "1,234"}]}
                    }}
                }}
            ]
        });

        let details = YouTubeExtractor::parse_watch_page(&watch_page(&player, &initial)).unwrap();
        assert_eq!(details.title.as_deref(), Some("Hello world"));
        assert_eq!(details.view_count, Some(12345));
        assert_eq!(details.upload_date.as_deref(), Some("20210305"));
        assert_eq!(details.comment_count, Some(1234));
    }

    #[test]
    fn test_comment_count_fallback() {
        let initial = json!({
            "contents": [{"commentsEntryPointHeaderRenderer": {"commentCount": {"simpleText": "2.5K"}}}]
        });
        assert_eq!(YouTubeExtractor::parse_comment_count(&initial), Some(2500));
        assert_eq!(YouTubeExtractor::parse_comment_count(&json!({})), None);
    }

    #[test]
    fn test_unavailable_video() {
        let player = json!({"playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}});
        let html = watch_page(&player, &json!({}));
        match YouTubeExtractor::parse_watch_page(&html) {
            Err(FetchError::Unavailable(reason)) => assert_eq!(reason, "Video unavailable"),
            other => panic!("expected unavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_player_response() {
        assert!(matches!(
            YouTubeExtractor::parse_watch_page("<html></html>"),
            Err(FetchError::Extraction(_))
        ));
    }

    #[test]
    fn test_listing_pages() {
        let initial = json!({
            "contents": {"twoColumnBrowseResultsRenderer": {"tabs": [
                {"tabRenderer": {"title": "Home", "content": {"videoRenderer": {"videoId": "home1"}}}},
                {"tabRenderer": {"title": "Videos", "selected": true, "content": {
                    "richGridRenderer": {"contents": [
                        {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "v1"}}}},
                        {"richItemRenderer": {"content": {"lockupViewModel": {
                            "contentId": "v2", "contentType": "LOCKUP_CONTENT_TYPE_VIDEO"
                        }}}},
                        {"richItemRenderer": {"content": {"lockupViewModel": {
                            "contentId": "PL1", "contentType": "LOCKUP_CONTENT_TYPE_PLAYLIST"
                        }}}},
                        {"continuationItemRenderer": {"continuationEndpoint": {
                            "continuationCommand": {"token": "tok1"}
                        }}}
                    ]}
                }}}
            ]}}
        });
        let page = ListingPage::from_initial_data(&initial).unwrap();
        assert_eq!(page.video_ids, ["v1", "v2"]);
        assert_eq!(page.continuation.as_deref(), Some("tok1"));

        let response = json!({"onResponseReceivedActions": [{"appendContinuationItemsAction": {
            "continuationItems": [
                {"richItemRenderer": {"content": {"videoRenderer": {"videoId": "v3"}}}}
            ]
        }}]});
        let page = ListingPage::from_continuation(&response);
        assert_eq!(page.video_ids, ["v3"]);
        assert_eq!(page.continuation, None);
    }

    #[test]
    fn test_innertube_config() {
        let html = r#"ytcfg.set({"INNERTUBE_API_KEY":"KEY123","INNERTUBE_CLIENT_VERSION":"2.2024"});"#;
        assert_eq!(
            InnertubeConfig::from_html(html),
            Some(InnertubeConfig {
                api_key: "KEY123".to_string(),
                client_version: "2.2024".to_string(),
            })
        );
        assert_eq!(InnertubeConfig::from_html("<html></html>"), None);
    }
}
