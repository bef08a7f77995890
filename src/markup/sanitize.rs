//! Sanitization of ingested document HTML using lol_html streaming rewrites
//!
//! Documents arrive from an external rendering pipeline; before they become
//! the substrate that anchors resolve against, scripts and event handlers
//! are stripped so serving them back to viewers is safe.

use lol_html::{element, rewrite_str, RewriteStrSettings};

/// Errors during sanitization
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error("HTML rewrite failed: {0}")]
    RewriteError(String),
}

/// Remove potentially dangerous elements and attributes while preserving
/// the content structure anchors depend on.
pub fn sanitize_document(html: &str) -> Result<String, SanitizeError> {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                // Remove script elements entirely
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                // Strip dangerous attributes from all elements
                element!("*", |el| {
                    // Remove event handlers
                    for attr in ["onclick", "onload", "onerror", "onmouseover", "onmouseup"] {
                        el.remove_attribute(attr);
                    }
                    // Remove javascript: URLs
                    if let Some(href) = el.get_attribute("href") {
                        if href.trim().to_lowercase().starts_with("javascript:") {
                            el.remove_attribute("href");
                        }
                    }
                    if let Some(src) = el.get_attribute("src") {
                        if src.trim().to_lowercase().starts_with("javascript:") {
                            el.remove_attribute("src");
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| SanitizeError::RewriteError(e.to_string()))?;

    Ok(result)
}
