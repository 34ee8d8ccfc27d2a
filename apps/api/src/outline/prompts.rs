// Prompt assembly for outline generation.
// The template body lives on disk (OUTLINE_PROMPT_PATH); only the fixed
// fragments and the placeholder rules live here.

use thiserror::Error;

/// The only placeholder an outline template may use.
pub const TOPIC_PLACEHOLDER: &str = "topic";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{0}}}' in prompt template")]
    UnknownPlaceholder(String),

    #[error("unbalanced brace at byte {0} in prompt template")]
    UnbalancedBrace(usize),
}

/// Fills `{topic}` in `template`. `{{` and `}}` are literal braces; any other
/// `{name}` or a stray brace is an error.
pub fn render_template(template: &str, topic: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + topic.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => return Err(TemplateError::UnbalancedBrace(pos)),
                        Some((_, ch)) => name.push(ch),
                    }
                }

                if name != TOPIC_PLACEHOLDER {
                    return Err(TemplateError::UnknownPlaceholder(name));
                }
                out.push_str(topic);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBrace(pos));
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// Appended to the prompt when the user supplied reference images.
pub fn image_advisory(image_count: usize) -> String {
    format!(
        "\n\n注意：用户提供了 {image_count} 张参考图片，请在生成大纲时考虑这些图片的内容和风格。\
这些图片可能是产品图、个人照片或场景图，请根据图片内容来优化大纲，使生成的内容与图片相关联。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_is_substituted_everywhere() {
        let rendered = render_template("主题：{topic}\n再次强调：{topic}", "春日露营").unwrap();
        assert_eq!(rendered, "主题：春日露营\n再次强调：春日露营");
    }

    #[test]
    fn test_doubled_braces_are_literal() {
        let rendered = render_template(r#"{{"title": "{topic}"}}"#, "Rust").unwrap();
        assert_eq!(rendered, r#"{"title": "Rust"}"#);
    }

    #[test]
    fn test_topic_braces_are_not_reinterpreted() {
        let rendered = render_template("T: {topic}", "{weird} }topic{").unwrap();
        assert_eq!(rendered, "T: {weird} }topic{");
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let err = render_template("{topic} for {audience}", "x").unwrap_err();
        assert_eq!(err, TemplateError::UnknownPlaceholder("audience".to_string()));
    }

    #[test]
    fn test_unbalanced_braces_are_rejected() {
        assert_eq!(
            render_template("oops {topic", "x").unwrap_err(),
            TemplateError::UnbalancedBrace(5)
        );
        assert_eq!(
            render_template("oops } here", "x").unwrap_err(),
            TemplateError::UnbalancedBrace(5)
        );
    }

    #[test]
    fn test_template_without_placeholder_passes_through() {
        assert_eq!(render_template("static text", "ignored").unwrap(), "static text");
    }

    #[test]
    fn test_bundled_template_renders() {
        let template = include_str!("../../prompts/outline_prompt.txt");
        let rendered = render_template(template, "城市骑行").unwrap();
        assert!(rendered.contains("主题：城市骑行"));
        assert!(rendered.contains("<page>"));
    }

    #[test]
    fn test_image_advisory_mentions_count() {
        let advisory = image_advisory(3);
        assert!(advisory.starts_with("\n\n注意：用户提供了 3 张参考图片"));
        assert!(advisory.ends_with("使生成的内容与图片相关联。"));
    }
}
