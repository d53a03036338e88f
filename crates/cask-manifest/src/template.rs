use std::fmt;

pub const VERSION_PLACEHOLDER: &str = "{version}";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),

    #[error("unknown placeholder `{{{0}}}`, only `{{version}}` is supported")]
    UnknownPlaceholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Version,
}

/// A download URL with `{version}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw:      String,
    segments: Vec<Segment>,
}

impl UrlTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw.char_indices();

        while let Some((pos, c)) = rest.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in rest.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(TemplateError::UnbalancedBrace(pos)),
                            c => name.push(c),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace(pos));
                    }
                    if name != "version" {
                        return Err(TemplateError::UnknownPlaceholder(name));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Version);
                }
                '}' => return Err(TemplateError::UnbalancedBrace(pos)),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Version))
            .count()
    }

    /// Substitute `version` verbatim. Callers are responsible for encoding it.
    pub fn render(&self, version: &str) -> String {
        let mut out = String::with_capacity(self.raw.len() + version.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Version => out.push_str(version),
            }
        }
        out
    }

    pub fn as_str(&self) -> &str { &self.raw }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.raw) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_placeholder() {
        let t = UrlTemplate::parse("https://host/download/v{version}/tool").unwrap();
        assert_eq!(t.placeholder_count(), 1);
        assert_eq!(t.render("1.2.3"), "https://host/download/v1.2.3/tool");
    }

    #[test]
    fn test_placeholder_at_edges() {
        let t = UrlTemplate::parse("{version}-x-{version}").unwrap();
        assert_eq!(t.placeholder_count(), 2);
        assert_eq!(t.render("9"), "9-x-9");
    }

    #[test]
    fn test_no_placeholder() {
        let t = UrlTemplate::parse("https://host/tool").unwrap();
        assert_eq!(t.placeholder_count(), 0);
        assert_eq!(t.render("1.0"), "https://host/tool");
    }

    #[test]
    fn test_unknown_placeholder() {
        assert_eq!(
            UrlTemplate::parse("https://host/{versoin}/tool"),
            Err(TemplateError::UnknownPlaceholder("versoin".into()))
        );
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(
            UrlTemplate::parse("https://host/{version"),
            Err(TemplateError::UnbalancedBrace(13))
        );
        assert_eq!(
            UrlTemplate::parse("https://host/version}"),
            Err(TemplateError::UnbalancedBrace(20))
        );
        assert!(UrlTemplate::parse("https://host/{{version}}").is_err());
    }
}
