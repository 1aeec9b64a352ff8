use slidedoc_core::Document;

use crate::serialize::serialize;

/// The editable areas of one slide. An area the layout does not have is
/// `None` and produces no markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlideAreas<'a> {
    pub title: Option<&'a Document>,
    pub subtitle: Option<&'a Document>,
    pub content: Option<&'a Document>,
}

/// Wrap the serialized areas in the slide container markup, one line per
/// tag, indented two spaces per level.
pub fn render_slide(class: &str, background: &str, areas: &SlideAreas<'_>) -> String {
    let mut lines = vec![format!(
        "<div class=\"slide {class}\" style=\"background: {background};\">"
    )];

    let named = [
        ("slide-title", areas.title),
        ("slide-subtitle", areas.subtitle),
        ("slide-content", areas.content),
    ];
    for (area_class, doc) in named {
        let Some(doc) = doc else {
            continue;
        };
        lines.push(format!("  <div class=\"{area_class}\">"));
        lines.push(format!("    {}", serialize(doc)));
        lines.push("  </div>".to_string());
    }

    lines.push("</div>".to_string());
    lines.join("\n")
}
