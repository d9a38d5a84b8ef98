//! Template engine for rendering the list and detail views.

use blotter_md::{PostDetail, PostSummary};
use minijinja::{context, Environment};

/// Context for rendering a page template.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Context {
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Base URL
    pub base_url: String,
    /// Post cards for the list view
    pub posts: Vec<PostSummary>,
    /// Post shown by the detail view
    pub post: Option<PostDetail>,
    /// Live reload script, only set by the dev server
    pub reload_script: Option<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with default templates.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("base.html".to_string(), BASE_TEMPLATE.to_string())
            .expect("Failed to add base template");

        env.add_template_owned("list.html".to_string(), LIST_TEMPLATE.to_string())
            .expect("Failed to add list template");

        env.add_template_owned("post.html".to_string(), POST_TEMPLATE.to_string())
            .expect("Failed to add post template");

        env.add_template_owned("not_found.html".to_string(), NOT_FOUND_TEMPLATE.to_string())
            .expect("Failed to add not found template");

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page(
        &self,
        template: &str,
        context: &Context,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;

        tmpl.render(context! {
            title => &context.title,
            site_title => &context.site_title,
            base_url => &context.base_url,
            posts => &context.posts,
            post => &context.post,
            reload_script => &context.reload_script,
        })
    }

    /// Render the list view.
    pub fn render_list(
        &self,
        site: &Context,
        posts: Vec<PostSummary>,
    ) -> Result<String, minijinja::Error> {
        let context = Context {
            title: "Posts".to_string(),
            posts,
            ..site.clone()
        };
        self.render_page("list.html", &context)
    }

    /// Render the detail view of one post.
    pub fn render_post(
        &self,
        site: &Context,
        post: PostDetail,
    ) -> Result<String, minijinja::Error> {
        let context = Context {
            title: post.title.clone(),
            post: Some(post),
            ..site.clone()
        };
        self.render_page("post.html", &context)
    }

    /// Render the page shown for an unknown post.
    pub fn render_not_found(&self, site: &Context) -> Result<String, minijinja::Error> {
        let context = Context {
            title: "Post not found".to_string(),
            ..site.clone()
        };
        self.render_page("not_found.html", &context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }} - {{ site_title }}</title>
  <link rel="stylesheet" href="{{ base_url|safe }}assets/main.css">
</head>
<body>
  <header class="site-header">
    <a href="{{ base_url|safe }}" class="site-title">{{ site_title }}</a>
  </header>
  <main class="main">
    {% block content %}{% endblock %}
  </main>
  <script src="{{ base_url|safe }}assets/main.js"></script>
  {% if reload_script %}<script src="{{ reload_script|safe }}"></script>{% endif %}
</body>
</html>"##;

const LIST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div id="content">
{% for post in posts %}
  <a class="postPreview" href="{{ base_url|safe }}post/{{ post.id }}/">
    <h2 class="heading">{{ post.title }}</h2>
    <p class="date">{{ post.date }}</p>
    <hr>
    <div class="preview">
      {% for line in post.preview.lines %}<p>{{ line }}</p>{% endfor %}
    </div>
  </a>
{% else %}
  <p class="empty">No posts yet.</p>
{% endfor %}
</div>
{% endblock %}"##;

const POST_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div id="postView">
  <a id="closePost" href="{{ base_url|safe }}">Close</a>
  <div id="postHeader">
    <h1 id="postHeading">{{ post.title }}</h1>
    <p class="date">{{ post.date }}</p>
    <hr>
  </div>
  <div id="postContent">
  {% for block in post.blocks %}
    {% if block.kind == "rule" %}<hr>
    {% elif block.kind == "heading" %}<h{{ block.level }}>{{ block.text }}</h{{ block.level }}>
    {% else %}<p>{% for inline in block.inlines %}{% if inline.kind == "line_break" %}<br/>{% else %}{{ inline.text }}{% endif %}{% endfor %}</p>
    {% endif %}
  {% endfor %}
  </div>
</div>
{% endblock %}"##;

const NOT_FOUND_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block content %}
<div class="not-found">
  <h1>{{ title }}</h1>
  <p><a href="{{ base_url|safe }}">Back to posts</a></p>
</div>
{% endblock %}"##;
