use lol_html::errors::RewritingError;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use std::collections::HashMap;

/// Rewrites `href`/`src` attributes of anchors, images, stylesheets, and
/// scripts according to `plan`
///
/// `plan` maps attribute values as they appear in the document (entities
/// decoded) to their replacement. Attributes not in the plan are left
/// untouched, so skipped links keep pointing at the live site.
pub fn rewrite_links(html: &str, plan: &HashMap<String, String>) -> Result<String, RewritingError> {
    if plan.is_empty() {
        return Ok(html.to_string());
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    if let Some(new) = lookup(plan, el.get_attribute("href")) {
                        el.set_attribute("href", new)?;
                    }
                    Ok(())
                }),
                element!("link[href]", |el| {
                    if let Some(new) = lookup(plan, el.get_attribute("href")) {
                        el.set_attribute("href", new)?;
                    }
                    Ok(())
                }),
                element!("img[src]", |el| {
                    if let Some(new) = lookup(plan, el.get_attribute("src")) {
                        el.set_attribute("src", new)?;
                    }
                    Ok(())
                }),
                element!("script[src]", |el| {
                    if let Some(new) = lookup(plan, el.get_attribute("src")) {
                        el.set_attribute("src", new)?;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
}

/// The rewriter sees attribute text exactly as written, while the plan is
/// keyed by the parsed value, so character references are decoded first.
fn lookup<'p>(plan: &'p HashMap<String, String>, value: Option<String>) -> Option<&'p str> {
    let value = value?;
    let decoded = html_escape::decode_html_entities(&value);
    plan.get(decoded.as_ref()).map(String::as_str)
}
