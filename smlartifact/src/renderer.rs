//! Render context and template rendering
//!
//! A [`TemplateRenderer`] turns a [`RenderContext`] into page bytes. It must
//! be a pure function of the context so that generating twice from the same
//! metadata produces byte-identical artifacts.

use crate::error::Result;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use smlcore::PlatformId;
use std::fmt::Debug;

/// One platform button, already ordered by priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPlatform {
    pub platform: PlatformId,
    pub name: &'static str,
    pub color: &'static str,
    pub priority: u8,
    pub url: String,
    pub native_app_uri_mobile: Option<String>,
    pub native_app_uri_desktop: Option<String>,
}

/// Everything a template needs to render one SmartLink page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Page title, `"<track> - <artist>"`
    pub title: String,
    pub track_title: String,
    pub artist_name: String,
    /// SEO description
    pub description: String,
    pub canonical_url: String,
    /// Cover image, or the default asset when the track has none
    pub cover_image_url: String,
    pub audio_preview_url: Option<String>,
    pub platforms: Vec<RenderedPlatform>,
}

pub trait TemplateRenderer: Debug + Send + Sync {
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>>;
}

const STYLE: &str = "\
body{margin:0;font-family:system-ui,sans-serif;background:#111;color:#eee}\
.smartlink{max-width:420px;margin:0 auto;padding:32px 16px;text-align:center}\
.cover{width:100%;border-radius:8px}\
.platforms{list-style:none;padding:0}\
.platform{display:block;margin:8px 0;padding:12px;border-radius:6px;color:#fff;text-decoration:none;font-weight:600}\
.preview{width:100%;margin:16px 0}";

/// Default renderer: a self-contained HTML page built with maud
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn page(&self, ctx: &RenderContext) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (ctx.title) }
                    meta name="description" content=(ctx.description);
                    link rel="canonical" href=(ctx.canonical_url);
                    meta property="og:type" content="music.song";
                    meta property="og:title" content=(ctx.title);
                    meta property="og:description" content=(ctx.description);
                    meta property="og:image" content=(ctx.cover_image_url);
                    meta property="og:url" content=(ctx.canonical_url);
                    meta name="twitter:card" content="summary_large_image";
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    main class="smartlink" {
                        img class="cover" src=(ctx.cover_image_url) alt=(format!("{} cover", ctx.track_title));
                        h1 class="track-title" { (ctx.track_title) }
                        h2 class="artist-name" { (ctx.artist_name) }
                        @if let Some(preview) = &ctx.audio_preview_url {
                            audio class="preview" controls preload="none" src=(preview) {}
                        }
                        ul class="platforms" {
                            @for p in &ctx.platforms {
                                li {
                                    a class="platform"
                                        href=(p.url)
                                        style=(format!("background-color:{}", p.color))
                                        data-platform=(p.platform.as_str())
                                        data-app-mobile=[p.native_app_uri_mobile.as_deref()]
                                        data-app-desktop=[p.native_app_uri_desktop.as_deref()]
                                        target="_blank"
                                        rel="noopener" { (p.name) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

impl TemplateRenderer for HtmlRenderer {
    fn render(&self, context: &RenderContext) -> Result<Vec<u8>> {
        Ok(self.page(context).into_string().into_bytes())
    }
}
