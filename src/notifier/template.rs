//! Plain-text and HTML bodies for delivery emails

use super::DeliveryMetadata;
use crate::artifact::ArtifactKind;

const BRAND: &str = "Letterdesk";

/// Plain-text body
pub fn text_body(content: &str, meta: &DeliveryMetadata, generated_at: &str) -> String {
    let mut lines = Vec::new();
    match meta.kind {
        ArtifactKind::Letter => {
            lines.push(format!("{} - Your letter is ready", BRAND));
            lines.push(String::new());
            lines.push("Letter details:".to_string());
            lines.push(format!("- Subject: {}", or_unspecified(&meta.subject)));
            lines.push(format!("- Tone: {}", or_unspecified(&meta.tone)));
            lines.push(format!("- Generated: {}", generated_at));
            lines.push(String::new());
            lines.push("Your letter:".to_string());
        }
        ArtifactKind::Speech => {
            lines.push(format!("{} - Your wedding speech is ready", BRAND));
            lines.push(String::new());
            lines.push(format!("Generated: {}", generated_at));
            lines.push(String::new());
            lines.push("Your speech:".to_string());
        }
    }
    lines.push(content.to_string());
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(format!("This text was generated automatically by {}.", BRAND));
    lines.push("Feel free to copy and adapt it to your needs.".to_string());
    lines.join("\n")
}

/// HTML body; every interpolated value is escaped
pub fn html_body(content: &str, meta: &DeliveryMetadata, generated_at: &str) -> String {
    let (heading, details) = match meta.kind {
        ArtifactKind::Letter => (
            "Your letter is ready",
            format!(
                "<p><strong>Subject:</strong> {}</p>\n\
                 <p><strong>Tone:</strong> {}</p>\n\
                 <p><strong>Generated:</strong> {}</p>",
                escape_html(or_unspecified(&meta.subject)),
                escape_html(or_unspecified(&meta.tone)),
                escape_html(generated_at)
            ),
        ),
        ArtifactKind::Speech => (
            "Your wedding speech is ready",
            format!(
                "<p><strong>Generated:</strong> {}</p>",
                escape_html(generated_at)
            ),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{brand}</title>
<style>
body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6;
  color: #333; max-width: 800px; margin: 0 auto; padding: 20px; background-color: #f5f5f5; }}
.container {{ background-color: white; padding: 30px; border-radius: 10px; }}
.header {{ text-align: center; margin-bottom: 30px; border-bottom: 2px solid #007bff; }}
.info-box {{ background-color: #e3f2fd; padding: 15px; border-radius: 5px; margin-bottom: 20px; }}
.content {{ background-color: #f8f9fa; padding: 25px; border-left: 4px solid #007bff;
  white-space: pre-wrap; font-family: 'Times New Roman', serif; }}
.footer {{ margin-top: 30px; text-align: center; color: #666; font-size: 12px; }}
</style>
</head>
<body>
<div class="container">
<div class="header"><h1>{brand}</h1><p>{heading}</p></div>
<div class="info-box">
{details}
</div>
<div class="content">{content}</div>
<div class="footer">
<p>This text was generated automatically by {brand}.</p>
<p>Feel free to copy and adapt it to your needs.</p>
</div>
</div>
</body>
</html>"#,
        brand = BRAND,
        heading = heading,
        details = details,
        content = escape_html(content),
    )
}

fn or_unspecified(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => "Not specified",
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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
