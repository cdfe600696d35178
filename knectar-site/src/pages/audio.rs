//! Blog article narration
//!
//! Points the article's `#ttsAudio` player at the cached recording of the
//! article text, synthesizing it on first view. When speech cannot be had
//! the player is disabled and a status line says so.

use knectar_common::tts::{cache_key, speech_text, AUDIO_UNAVAILABLE};
use tracing::{debug, warn};

use super::html::{escape_text, Document, Selector};
use crate::config::TTS_CACHE_DIR;
use crate::tts::TtsService;

/// Site path serving the recording for a cache key
pub fn audio_url(key: &str) -> String {
    format!("/{}/{}.mp3", TTS_CACHE_DIR, key)
}

/// Text the player reads: the rendered `.blog-post`
///
/// `None` when the page has no player, the player is hidden or the article
/// has no text.
pub fn narration(doc: &Document) -> Option<String> {
    doc.first(Selector::Id("ttsAudio"))?;
    let article = doc.first(Selector::Class("blog-post"))?;
    if let Some(player) = doc.first(Selector::Class("tts-player")) {
        if doc.attr(player, "style").is_some_and(|s| s.contains("display: none")) {
            return None;
        }
    }
    let text = speech_text(&doc.text(article));
    (!text.is_empty()).then_some(text)
}

/// Fill the player, or mark it unavailable
pub async fn fill_player(doc: &mut Document, tts: &TtsService) {
    let Some(text) = narration(doc) else {
        return;
    };

    match tts.speak(&text).await {
        Ok(_) => {
            let key = cache_key(&text);
            debug!("Article audio ready: {}", key);
            if let Some(audio) = doc.first(Selector::Id("ttsAudio")) {
                doc.set_attr(audio, "src", &audio_url(&key));
            }
        }
        Err(e) => {
            warn!("Article audio unavailable: {}", e);
            mark_unavailable(doc);
        }
    }
}

fn mark_unavailable(doc: &mut Document) {
    let status = format!(r#"<span class="tts-status">{}</span>"#, escape_text(AUDIO_UNAVAILABLE));
    if let Some(player) = doc.first(Selector::Class("tts-player")) {
        doc.append_html(player, &status);
    } else if let Some(article) = doc.first(Selector::Class("blog-post")) {
        doc.prepend_html(article, &status);
    }
    if let Some(audio) = doc.first(Selector::Id("ttsAudio")) {
        doc.set_flag(audio, "disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    const BLOG: &str = r#"<main><article class="blog-post"><h1>Hello</h1>
<div class="tts-player"><audio id="ttsAudio" controls></audio></div>
<p>Some   words.</p></article></main>"#;

    #[test]
    fn test_narration_reads_article_text() {
        let doc = Document::parse(BLOG);
        assert_eq!(narration(&doc).as_deref(), Some("Hello Some words."));
    }

    #[test]
    fn test_no_narration_for_hidden_player_or_missing_audio() {
        let hidden = BLOG.replace(r#"class="tts-player""#, r#"class="tts-player" style="display: none""#);
        assert!(narration(&Document::parse(hidden)).is_none());

        let no_audio = BLOG.replace(r#"<audio id="ttsAudio" controls></audio>"#, "");
        assert!(narration(&Document::parse(no_audio)).is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_speech_marks_player_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let tts = TtsService::new(&SiteConfig::new(dir.path())).unwrap();
        let mut doc = Document::parse(BLOG);

        fill_player(&mut doc, &tts).await;

        let html = doc.into_html();
        assert!(html.contains(r#"<audio id="ttsAudio" controls disabled></audio>"#));
        assert!(html.contains(r#"<span class="tts-status">Audio unavailable</span></div>"#));
    }

    #[test]
    fn test_audio_url() {
        assert_eq!(audio_url("abc"), "/tts_cache/abc.mp3");
    }
}
