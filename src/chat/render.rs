//! Server-side rendering of the chat page.
//!
//! The page is re-rendered in full from the serialized transcript on every
//! request; the transcript itself travels back and forth in a hidden field.

use super::transcript::{decode, Turn, TranscriptError, ROLE_ASSISTANT, ROLE_USER};

pub const PAGE_TITLE: &str = "COVID-19 Chatbot";
pub const LOGO_PATH: &str = "/assets/logo.svg";

pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64" width="64" height="64">
<circle cx="32" cy="32" r="32" fill="#0d6efd"/>
<circle cx="32" cy="32" r="14" fill="#ffffff"/>
<g stroke="#ffffff" stroke-width="4" stroke-linecap="round">
<line x1="32" y1="6" x2="32" y2="16"/><line x1="32" y1="48" x2="32" y2="58"/>
<line x1="6" y1="32" x2="16" y2="32"/><line x1="48" y1="32" x2="58" y2="32"/>
<line x1="13.6" y1="13.6" x2="20.7" y2="20.7"/><line x1="43.3" y1="43.3" x2="50.4" y2="50.4"/>
<line x1="13.6" y1="50.4" x2="20.7" y2="43.3"/><line x1="43.3" y1="20.7" x2="50.4" y2="13.6"/>
</g>
</svg>
"##;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";

const PAGE_STYLE: &str = r#"
.conversation { overflow-y: auto; display: flex; height: calc(90vh - 132px); flex-direction: column-reverse; }
.bubble { max-width: 60%; width: max-content; padding: 5px 10px; border-radius: 25px; margin-bottom: 20px; white-space: pre-wrap; }
.bubble .card-body { padding: 0.5rem; }
.bubble-user { margin-left: auto; margin-right: 0; }
.bubble-assistant { margin-left: 0; margin-right: auto; }
.thumbnail { border-radius: 50px; height: 36px; margin-right: 5px; float: left; }
"#;

/// One bubble per turn; any role other than user/assistant aborts the render.
pub fn render_transcript(turns: &[Turn]) -> Result<String, TranscriptError> {
    let mut html = String::new();
    for turn in turns {
        html.push_str(&render_turn(turn)?);
        html.push('\n');
    }
    Ok(html)
}

fn render_turn(turn: &Turn) -> Result<String, TranscriptError> {
    let text = escape_html(&turn.content);
    match turn.role.as_str() {
        ROLE_USER => Ok(format!(
            r#"<div class="card text-white bg-primary bubble bubble-user"><div class="card-body">{}</div></div>"#,
            text
        )),
        ROLE_ASSISTANT => Ok(format!(
            r#"<div class="clearfix"><img class="thumbnail" src="{}" alt="assistant"><div class="card bg-light bubble bubble-assistant"><div class="card-body">{}</div></div></div>"#,
            LOGO_PATH, text
        )),
        other => Err(TranscriptError::UnknownRole(other.to_string())),
    }
}

/// Full page for a serialized transcript. The input field is always empty.
pub fn render_page(chat_history: &str) -> Result<String, TranscriptError> {
    let turns = decode(chat_history)?;
    let conversation = render_transcript(&turns)?;

    let mut page = String::with_capacity(conversation.len() + chat_history.len() + 2048);
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("<meta charset=\"utf-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    page.push_str(&format!("<title>{}</title>\n", PAGE_TITLE));
    page.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", BOOTSTRAP_CSS));
    page.push_str(&format!("<style>{}</style>\n", PAGE_STYLE));
    page.push_str("</head>\n<body>\n<div class=\"container\">\n");
    page.push_str(&format!(
        "<div class=\"row\"><div class=\"col-md-8\"><h1 style=\"margin-top: 5px\">{}</h1></div></div>\n<hr>\n",
        PAGE_TITLE
    ));
    page.push_str("<div class=\"conversation\"><div id=\"display-conversation\">\n");
    page.push_str(&conversation);
    page.push_str("</div></div>\n");
    page.push_str(
        "<form method=\"post\" action=\"/\" class=\"input-group\" \
         onsubmit=\"document.getElementById('loading-component').hidden = false;\">\n",
    );
    page.push_str(&format!(
        "<input type=\"hidden\" name=\"chat_history\" value=\"{}\">\n",
        escape_html(chat_history)
    ));
    page.push_str(
        "<input id=\"user-input\" class=\"form-control\" type=\"text\" name=\"user_input\" \
         placeholder=\"Write your message...\" value=\"\" autocomplete=\"off\" autofocus>\n",
    );
    page.push_str("<button id=\"submit\" class=\"btn btn-primary\" type=\"submit\">Submit</button>\n");
    page.push_str("</form>\n");
    page.push_str(
        "<div id=\"loading-component\" class=\"text-center mt-2\" hidden>\
         <div class=\"spinner-border text-primary\" role=\"status\"></div></div>\n",
    );
    page.push_str("</div>\n</body>\n</html>\n");

    Ok(page)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::transcript::encode;

    #[test]
    fn user_and_assistant_bubbles_are_styled_differently() {
        let html = render_transcript(&[Turn::user("hello"), Turn::assistant("hi there")]).unwrap();
        assert!(html.contains("bubble-user\"><div class=\"card-body\">hello</div>"));
        assert!(html.contains("bubble-assistant\"><div class=\"card-body\">hi there</div>"));
        assert!(html.contains(LOGO_PATH));
    }

    #[test]
    fn unknown_role_fails_render() {
        let turns = vec![
            Turn::user("ok"),
            Turn {
                role: "system".to_string(),
                content: "nope".to_string(),
            },
        ];
        match render_transcript(&turns) {
            Err(TranscriptError::UnknownRole(role)) => assert_eq!(role, "system"),
            other => panic!("expected UnknownRole, got {:?}", other),
        }
    }

    #[test]
    fn content_is_escaped() {
        let html = render_transcript(&[Turn::user("<script>alert('x')</script>")]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn page_carries_serialized_history_in_hidden_field() {
        let history = encode(&[Turn::user("a \"quoted\" word")]).unwrap();
        let page = render_page(&history).unwrap();

        assert!(page.contains("<h1 style=\"margin-top: 5px\">COVID-19 Chatbot</h1>"));
        assert!(page.contains("placeholder=\"Write your message...\" value=\"\""));
        let hidden = format!("name=\"chat_history\" value=\"{}\"", escape_html(&history));
        assert!(page.contains(&hidden));
        assert!(page.contains("a &quot;quoted&quot; word"));
    }

    #[test]
    fn empty_history_renders_empty_conversation() {
        let page = render_page("[]").unwrap();
        assert!(!page.contains("bubble-user\">"));
        assert!(page.contains("value=\"[]\""));
    }
}
