//! `net.fetch`: read a webpage's content as markdown-ish text.

use std::sync::LazyLock;

use regex::Regex;

use crate::tool::{ToolDescriptor, ToolRegistration, ToolResult};

const MAX_OUTPUT_LENGTH: usize = 40_000;
const TIMEOUT_SECS: u64 = 20;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static MULTILINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static HTML_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"<h1[^>]*>([^<]*)</h1>").expect("valid regex"), "\n# $1\n"),
        (Regex::new(r"<h2[^>]*>([^<]*)</h2>").expect("valid regex"), "\n## $1\n"),
        (Regex::new(r"<h3[^>]*>([^<]*)</h3>").expect("valid regex"), "\n### $1\n"),
        (Regex::new(r"<h4[^>]*>([^<]*)</h4>").expect("valid regex"), "\n#### $1\n"),
        (Regex::new(r"<p[^>]*>").expect("valid regex"), "\n"),
        (Regex::new(r"<br\s*/?>").expect("valid regex"), "\n"),
        (Regex::new(r"<li[^>]*>").expect("valid regex"), "\n- "),
        (Regex::new(r#"<a[^>]*href=["']([^"']*)["'][^>]*>([^<]*)</a>"#).expect("valid regex"), "[$2]($1)"),
        (Regex::new(r"<strong[^>]*>([^<]*)</strong>").expect("valid regex"), "**$1**"),
        (Regex::new(r"<b[^>]*>([^<]*)</b>").expect("valid regex"), "**$1**"),
        (Regex::new(r"<em[^>]*>([^<]*)</em>").expect("valid regex"), "*$1*"),
        (Regex::new(r"<i[^>]*>([^<]*)</i>").expect("valid regex"), "*$1*"),
        (Regex::new(r"<code[^>]*>([^<]*)</code>").expect("valid regex"), "`$1`"),
    ]
});

fn html_to_text(html: &str) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let mut text = text.into_owned();

    for (re, replacement) in HTML_PATTERNS.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    text = text.replace("</p>", "\n").replace("</li>", "");
    text = TAG_RE.replace_all(&text, "").into_owned();
    text = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&#39;", "'");
    text = MULTILINE_RE.replace_all(&text, "\n\n").into_owned();

    text.trim().to_string()
}

fn truncate(content: &str) -> String {
    if content.len() <= MAX_OUTPUT_LENGTH {
        content.to_string()
    } else {
        format!("{}...\n\n_Content truncated to {MAX_OUTPUT_LENGTH} characters_", &content[..MAX_OUTPUT_LENGTH])
    }
}

/// Build the `net.fetch` descriptor + registration pair.
#[must_use]
pub fn register() -> (ToolDescriptor, ToolRegistration) {
    let descriptor = ToolDescriptor::builtin("net.fetch", "net.fetch")
        .with_description("Fetch a webpage and return its content as markdown-ish plain text.")
        .with_input_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "format": "uri",
                    "description": "The URL to fetch; must be http:// or https://"
                }
            },
            "required": ["url"]
        }))
        .with_permission("net");

    let registration = ToolRegistration::builtin(|args| async move {
        let Some(url) = args.get("url").and_then(|v| v.as_str()) else {
            return ToolResult::err("missing required argument `url`");
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return ToolResult::err("url must start with http:// or https://");
        }

        let client = match reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
        {
            Ok(client) => client,
            Err(err) => return ToolResult::err(format!("failed to build http client: {err}")),
        };

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return ToolResult::err("request timed out"),
            Err(err) => return ToolResult::err(format!("error fetching webpage: {err}")),
        };

        if !response.status().is_success() {
            return ToolResult::err(format!("http error: {}", response.status()));
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(err) => return ToolResult::err(format!("failed to read response body: {err}")),
        };

        ToolResult::ok(serde_json::json!({ "content": truncate(&html_to_text(&html)) }))
    });

    (descriptor, registration)
}
