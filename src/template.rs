//! Page template loading and rendering.
//!
//! The template file is parsed once with Tera and registered under a fixed
//! `.html` name, so HTML autoescaping applies whatever the file is called.
//! Placeholders are `{{ slug }}`, `{{ title }}` and `{{ description }}`.

use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use tracing::info;

use crate::error::PipelineError;
use crate::page::Page;

const PAGE_TEMPLATE: &str = "page.html";

/// Parsed template. Rendering only reads it, so one instance can be shared
/// across tasks behind an `Arc`.
pub struct PageTemplate {
    tera: Tera,
    source: PathBuf,
}

impl PageTemplate {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        let template = Self::parse(&content, path)?;
        info!("Loaded template: {}", path.display());
        Ok(template)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, PipelineError> {
        let mut tera = Tera::default();
        tera.add_raw_template(PAGE_TEMPLATE, content)
            .map_err(|source| PipelineError::TemplateSyntax {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(PageTemplate {
            tera,
            source: path.to_path_buf(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn render(&self, page: &Page) -> tera::Result<Vec<u8>> {
        let context = Context::from_serialize(page)?;
        let mut out = Vec::new();
        self.tera.render_to(PAGE_TEMPLATE, &context, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn template(content: &str) -> PageTemplate {
        PageTemplate::parse(content, Path::new("inline.html")).unwrap()
    }

    fn page(slug: &str, title: &str, description: &str) -> Page {
        Page {
            slug: slug.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    #[test]
    fn substitutes_all_fields() {
        let t = template("<h1>{{ title }}</h1><p>{{ description }}</p><a href=\"/{{ slug }}\">");
        let out = t.render(&page("a", "Alpha", "First")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<h1>Alpha</h1><p>First</p><a href=\"/a\">"
        );
    }

    #[test]
    fn escapes_html_in_values() {
        let t = template("{{ title }}");
        let out = t.render(&page("x", "<b>Fish & Chips</b>", "")).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "&lt;b&gt;Fish &amp; Chips&lt;&#x2F;b&gt;"
        );
    }

    #[test]
    fn unknown_placeholder_fails_at_render() {
        let t = template("{{ price }}");
        assert!(t.render(&page("x", "X", "")).is_err());
    }

    #[test]
    fn syntax_error_is_a_template_error() {
        let err = PageTemplate::parse("{{ title ", Path::new("broken.html")).err().unwrap();
        assert!(matches!(err, PipelineError::TemplateSyntax { .. }));
    }

    #[test]
    fn missing_file_is_a_template_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.html");
        let err = PageTemplate::load(&missing).err().unwrap();
        match err {
            PipelineError::TemplateRead { path, .. } => assert_eq!(path, missing),
            other => panic!("expected template read error, got {other:?}"),
        }
    }

    #[test]
    fn loads_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("template.txt");
        std::fs::write(&file, "{{ title }}").unwrap();
        let t = PageTemplate::load(&file).unwrap();
        assert_eq!(t.source(), file);
        assert_eq!(t.render(&page("a", "A&B", "")).unwrap(), b"A&amp;B");
    }

    #[test]
    fn shared_across_threads() {
        let t = Arc::new(template("{{ slug }}:{{ title }}"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let t = Arc::clone(&t);
                std::thread::spawn(move || {
                    let p = page(&format!("p{i}"), &format!("T{i}"), "");
                    String::from_utf8(t.render(&p).unwrap()).unwrap()
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(h.join().unwrap(), format!("p{i}:T{i}"));
        }
    }
}
