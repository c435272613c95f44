//! Template engine
//!
//! A thin wrapper around Tera. Templates are loaded from a directory at
//! startup; every page render goes through a context that carries the
//! request's navigation state and session identity explicitly, so the
//! engine holds no per-request state of its own.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera, Value};

use crate::models::SessionUser;

/// Template engine for rendering pages
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load all `.html` templates under `path` (recursively).
    ///
    /// Template names are paths relative to the directory, so inheritance
    /// (`{% extends "base.html" %}`) works the same from any subdirectory.
    pub fn new(path: &Path) -> Result<Self> {
        let mut tera = Tera::default();

        add_templates_from_dir(&mut tera, path, path)
            .with_context(|| format!("Failed to load templates from {:?}", path))?;

        tera.build_inheritance_chains()
            .context("Failed to build template inheritance chains")?;

        tera.register_filter("format_date", format_date);

        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera
            .render(template, context)
            .with_context(|| format!("Failed to render '{}'", template))
    }

    /// Render a template, falling back to a plain error body.
    ///
    /// Render failures are logged and must not take the request down; the
    /// client gets an unstyled one-liner instead.
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("Template render failed: {:#}", e);
                format!("The page '{}' could not be rendered", template)
            }
        }
    }
}

/// Build the context every page render starts from.
///
/// Navigation state and session identity are passed in explicitly by the
/// caller; nothing here reads shared mutable state.
pub fn base_context(
    active_route: &str,
    viewing_category: Option<&str>,
    session_user: Option<&SessionUser>,
) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("active_route", active_route);
    context.insert("viewing_category", &viewing_category);
    context.insert("session", &session_user);
    context
}

fn add_templates_from_dir(tera: &mut Tera, base_path: &Path, current_path: &Path) -> Result<()> {
    for entry in fs::read_dir(current_path)
        .with_context(|| format!("Failed to read template directory {:?}", current_path))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            add_templates_from_dir(tera, base_path, &path)?;
        } else if path.extension().is_some_and(|ext| ext == "html") {
            let name = path
                .strip_prefix(base_path)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {:?}", path))?;
            tera.add_raw_template(&name, &content)
                .with_context(|| format!("Failed to parse template {:?}", path))?;
        }
    }

    Ok(())
}

/// Tera filter rendering dates as `YYYY-MM-DD`.
///
/// Accepts both plain calendar dates and RFC 3339 timestamps.
fn format_date(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date expects a string"))?;

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Value::String(date.format("%Y-%m-%d").to_string()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::String(dt.date_naive().format("%Y-%m-%d").to_string()));
    }

    Err(tera::Error::msg(format!(
        "format_date: unrecognized date '{}'",
        s
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine_with(templates: &[(&str, &str)]) -> TemplateEngine {
        let dir = TempDir::new().unwrap();
        for (name, content) in templates {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        TemplateEngine::new(dir.path()).unwrap()
    }

    #[test]
    fn test_render_simple_template() {
        let engine = engine_with(&[("hello.html", "Hello {{ name }}!")]);
        let mut context = TeraContext::new();
        context.insert("name", "world");

        assert_eq!(engine.render("hello.html", &context).unwrap(), "Hello world!");
    }

    #[test]
    fn test_render_with_inheritance() {
        let engine = engine_with(&[
            ("base.html", "<nav/>{% block content %}{% endblock %}"),
            (
                "page.html",
                r#"{% extends "base.html" %}{% block content %}body{% endblock %}"#,
            ),
        ]);

        let html = engine.render("page.html", &TeraContext::new()).unwrap();
        assert_eq!(html, "<nav/>body");
    }

    #[test]
    fn test_format_date_filter() {
        let engine = engine_with(&[("d.html", "{{ when | format_date }}")]);

        let mut context = TeraContext::new();
        context.insert("when", "2024-03-05");
        assert_eq!(engine.render("d.html", &context).unwrap(), "2024-03-05");

        let mut context = TeraContext::new();
        context.insert("when", "2024-03-05T10:30:00Z");
        assert_eq!(engine.render("d.html", &context).unwrap(), "2024-03-05");
    }

    #[test]
    fn test_render_with_fallback_swallows_errors() {
        let engine = engine_with(&[("ok.html", "fine")]);
        let body = engine.render_with_fallback("missing.html", &TeraContext::new());
        assert!(body.contains("missing.html"));
    }

    #[test]
    fn test_base_context_carries_navigation_state() {
        let context = base_context("/shop", Some("tools"), None);
        let json = context.into_json();
        assert_eq!(json["active_route"], "/shop");
        assert_eq!(json["viewing_category"], "tools");
        assert_eq!(json["session"], serde_json::Value::Null);
    }
}
