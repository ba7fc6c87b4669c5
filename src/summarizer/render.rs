use super::SummaryOutcome;

const ATTRIBUTION: &str = "✨ Summarized with Gemini";
const PERMISSION_DENIED: &str =
    "This service account doesn't have permission to talk to Gemini via Vertex";
const GENERIC_FAILURE: &str = "Error contacting Gemini";
const SKELETON: &str = "✨ Summarizing reviews with Gemini...";

/// Renders an outcome as an HTML fragment.
pub fn render(outcome: &SummaryOutcome) -> String {
    match outcome {
        SummaryOutcome::Summary(text) => summary_block(&[text, ATTRIBUTION]),
        SummaryOutcome::PermissionDenied => format!("<p>{}</p>", escape_html(PERMISSION_DENIED)),
        SummaryOutcome::Failed(message) => summary_block(&[GENERIC_FAILURE, message]),
    }
}

/// Placeholder shown while a summary is being computed.
pub fn render_skeleton() -> String {
    summary_block(&[SKELETON])
}

fn summary_block(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();
    format!("<div class=\"restaurant__review_summary\">{}</div>", body)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_summary() {
        let html = render(&SummaryOutcome::Summary("People love the tacos.".into()));
        assert_eq!(
            html,
            "<div class=\"restaurant__review_summary\"><p>People love the tacos.</p>\
             <p>✨ Summarized with Gemini</p></div>"
        );
    }

    #[test]
    fn test_render_permission_denied() {
        let html = render(&SummaryOutcome::PermissionDenied);
        assert!(html.starts_with("<p>"));
        assert!(html.contains("doesn&#39;t have permission to talk to Gemini via Vertex"));
        assert!(!html.contains("Error contacting Gemini"));
    }

    #[test]
    fn test_render_failure_includes_raw_message() {
        let html = render(&SummaryOutcome::Failed("[500 Internal Server Error] boom".into()));
        assert!(html.contains("<p>Error contacting Gemini</p>"));
        assert!(html.contains("<p>[500 Internal Server Error] boom</p>"));
    }

    #[test]
    fn test_render_escapes_html() {
        let html = render(&SummaryOutcome::Summary("<script>alert(\"x\")</script> & more".into()));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; more"));
    }

    #[test]
    fn test_render_skeleton() {
        assert_eq!(
            render_skeleton(),
            "<div class=\"restaurant__review_summary\"><p>✨ Summarizing reviews with Gemini...</p></div>"
        );
    }
}
