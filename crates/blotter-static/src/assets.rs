//! Asset pipeline for CSS and JavaScript processing.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the main CSS file.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the main JavaScript file.
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

const DEFAULT_CSS: &str = r#"/* blotter default theme */

:root {
  --background: #fdfdfc;
  --foreground: #1f2328;
  --muted: #6e7781;
  --border: #d0d7de;
  --card: #ffffff;
  --accent: #0969da;
  --content-max-width: 720px;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: var(--font-sans, system-ui, -apple-system, sans-serif);
  background: var(--background);
  color: var(--foreground);
  line-height: 1.6;
}

.site-header {
  border-bottom: 1px solid var(--border);
  padding: 1rem 1.5rem;
}

.site-title {
  font-weight: 700;
  font-size: 1.25rem;
  color: var(--foreground);
  text-decoration: none;
}

.main {
  max-width: var(--content-max-width);
  margin: 0 auto;
  padding: 2rem 1.5rem;
}

hr {
  border: none;
  border-top: 1px solid var(--border);
  margin: 0.75rem 0;
}

.date {
  font-size: 0.875rem;
  color: var(--muted);
}

/* List view */
.postPreview {
  display: block;
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 0.5rem;
  padding: 1.25rem 1.5rem;
  margin-bottom: 1.25rem;
  color: inherit;
  text-decoration: none;
  transition: border-color 0.15s;
}

.postPreview:hover {
  border-color: var(--accent);
}

.postPreview .heading {
  font-size: 1.5rem;
  font-weight: 600;
}

.preview p {
  min-height: 1.6em;
  color: var(--muted);
  overflow: hidden;
  text-overflow: ellipsis;
  white-space: nowrap;
}

.empty {
  color: var(--muted);
}

/* Detail view */
#closePost {
  display: inline-block;
  margin-bottom: 1rem;
  color: var(--accent);
  text-decoration: none;
}

#postHeading {
  font-size: 2.25rem;
  font-weight: 700;
}

#postContent h1,
#postContent h2,
#postContent h3,
#postContent h4,
#postContent h5,
#postContent h6 {
  font-weight: 600;
  margin: 1.5rem 0 0.75rem;
}

#postContent p {
  margin-bottom: 1rem;
}

.not-found a {
  color: var(--accent);
}
"#;

const DEFAULT_JS: &str = r#"// blotter runtime
(function() {
  'use strict';

  // Escape closes the open post
  document.addEventListener('keydown', (event) => {
    if (event.key !== 'Escape') return;

    const close = document.getElementById('closePost');
    if (close) {
      window.location.href = close.href;
    }
  });
})();
"#;
