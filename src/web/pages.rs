//! HTML rendering for the single-page UI.

use crate::report::{ArtworkOrigin, ArtworkSource, Report};
use axum::http::StatusCode;
use pulldown_cmark::escape::escape_html;
use pulldown_cmark::{html, Event, Options, Parser};

const STYLE: &str = r#"
    body { font-family: system-ui, -apple-system, sans-serif; margin: 0; line-height: 1.6; color: #222; }
    .layout { display: flex; min-height: 100vh; }
    aside { width: 280px; padding: 1rem; background: #f4f4f6; border-right: 1px solid #ddd; }
    main { flex: 1; padding: 1rem; max-width: 1200px; margin: 0 auto; }
    .columns { display: flex; gap: 1.5rem; flex-wrap: wrap; }
    .columns > section { flex: 1; min-width: 240px; }
    label { display: block; margin-top: 0.6rem; font-size: 0.9rem; }
    input[type=text], input[type=password], select { width: 100%; padding: 0.4rem; box-sizing: border-box; }
    button, .button { display: inline-block; margin-top: 1rem; padding: 0.6rem 1.2rem; background: #ff4b4b; color: #fff; border: 0; border-radius: 4px; text-decoration: none; cursor: pointer; }
    .notice { background: #e6f4ea; padding: 0.5rem; border-radius: 4px; margin-top: 0.5rem; }
    .error { background: #fdecea; color: #8a1c1c; padding: 0.75rem; border-radius: 4px; margin: 1rem 0; }
    .artwork img { max-width: 100%; max-height: 480px; }
    hr { border: 0; border-top: 1px solid #ddd; margin: 1.5rem 0; }
"#;

/// Form values echoed back so a failed submission keeps what the user typed.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub artist_name: String,
    pub title: String,
    pub source: ArtworkSource,
    pub origin: ArtworkOrigin,
}

/// Everything the main page shows.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub has_model_key: bool,
    pub has_search_key: bool,
    pub notices: Vec<String>,
    pub error: Option<String>,
    pub form: FormValues,
    pub report: Option<&'a Report>,
}

/// Escape text for use in HTML content or attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail
    escape_html(&mut out, text).ok();
    out
}

/// Render report markdown to HTML. Raw HTML in the markdown is shown as text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn select_options<T: Copy + PartialEq>(all: &[T], selected: T, label: fn(T) -> &'static str) -> String {
    all.iter()
        .map(|&item| {
            let text = escape(label(item));
            let marker = if item == selected { " selected" } else { "" };
            format!(r#"<option value="{text}"{marker}>{text}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn sidebar(view: &PageView<'_>) -> String {
    let status = |set: bool| if set { "configured" } else { "not set" };
    let notices: String = view
        .notices
        .iter()
        .map(|n| format!(r#"<div class="notice">{}</div>"#, escape(n)))
        .collect();

    format!(
        r#"<aside>
  <h2>🔐 API Configuration</h2>
  <hr>
  <form method="post" action="/credentials">
    <label for="openai_api_key">OpenAI API Key <small>({model_status})</small></label>
    <input type="password" id="openai_api_key" name="openai_api_key" autocomplete="off">
    <small>Don't have an API key? Get one <a href="https://platform.openai.com/account/api-keys">here</a>.</small>
    <label for="serp_api_key">Serp API Key <small>({search_status})</small></label>
    <input type="password" id="serp_api_key" name="serp_api_key" autocomplete="off">
    <small>Don't have an API key? Get one <a href="https://serpapi.com/manage-api-key">here</a>.</small>
    <button type="submit">Save keys</button>
  </form>
  {notices}
  <hr>
</aside>"#,
        model_status = status(view.has_model_key),
        search_status = status(view.has_search_key),
        notices = notices,
    )
}

fn artwork_form(form: &FormValues) -> String {
    format!(
        r#"<form method="post" action="/report" enctype="multipart/form-data">
  <hr>
  <div class="columns">
    <section>
      <h3>🖼️ Upload Artwork</h3>
      <label for="image">Choose an artwork image</label>
      <input type="file" id="image" name="image" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
    </section>
    <section>
      <h3>🧑‍🎨 Artwork Details</h3>
      <label for="artist_name">Do you know the name of the artist?</label>
      <input type="text" id="artist_name" name="artist_name" value="{artist}" placeholder="e.g., Claude Monet (optional)">
      <label for="artwork_title">Do you know the title of the artwork?</label>
      <input type="text" id="artwork_title" name="artwork_title" value="{title}" placeholder="e.g., Water Lilies (optional)">
    </section>
    <section>
      <h3>📚 Context</h3>
      <label for="source">Where did you come across this artwork?</label>
      <select id="source" name="source">
{sources}
      </select>
      <label for="artwork_origin">Is this a photo of a physical or digital artwork?</label>
      <select id="artwork_origin" name="artwork_origin">
{origins}
      </select>
    </section>
  </div>
  <hr>
  <button type="submit">🎨 Generate Artwork Report</button>
</form>"#,
        artist = escape(&form.artist_name),
        title = escape(&form.title),
        sources = select_options(&ArtworkSource::ALL, form.source, ArtworkSource::label),
        origins = select_options(&ArtworkOrigin::ALL, form.origin, ArtworkOrigin::label),
    )
}

fn report_section(report: &Report) -> String {
    format!(
        r#"<section class="artwork">
  <h2>🖼️ Uploaded Artwork</h2>
  <img src="/report/image" alt="Uploaded artwork">
</section>
<article class="report">
{body}
</article>
<a class="button" href="/report/download" download="artwork_style_brief.md">📥 Download Artwork Report</a>"#,
        body = render_markdown(report.as_str()),
    )
}

fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>{style}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        style = STYLE,
        body = body,
    )
}

/// The main page.
pub fn render_page(view: &PageView<'_>) -> String {
    let error = view
        .error
        .as_deref()
        .map(|e| format!(r#"<div class="error" role="alert">{}</div>"#, escape(e)))
        .unwrap_or_default();
    let report = view.report.map(report_section).unwrap_or_default();

    let body = format!(
        r#"<div class="layout">
{sidebar}
<main>
  <h1 style="font-size: 2.5rem;">🎨 Art Connoisseur Bot</h1>
  <p>Welcome to Art Connoisseur Bot — a smart tool that analyzes your uploaded artwork to uncover its style, context, and artistic connections, bridging visual analysis with art history insight.</p>
  {form}
  {error}
  {report}
</main>
</div>"#,
        sidebar = sidebar(view),
        form = artwork_form(&view.form),
        error = error,
        report = report,
    );

    document("Art Connoisseur Bot", &body)
}

/// Page shown when a request fails outright.
pub fn render_error(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<main>
  <h1>Something went wrong</h1>
  <div class="error" role="alert"><strong>{status}</strong><br>{message}</div>
  <a class="button" href="/">Back</a>
</main>"#,
        status = escape(&status.to_string()),
        message = escape(message),
    );
    document("Art Connoisseur Bot - Error", &body)
}
