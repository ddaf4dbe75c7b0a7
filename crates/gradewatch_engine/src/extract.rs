//! The one place that knows what the portal's markup looks like.
//!
//! Everything here is a pure function from HTML text to plain data, so the
//! brittle structural assumptions can be exercised against fixtures and
//! swapped out when the portal changes.

use scraper::{ElementRef, Html, Selector};

/// Marker preceding the CSRF token on the portal root page.
pub const CSRF_MARKER: &str = "csrfmiddlewaretoken: '";

/// Scans for the quoted CSRF token after [`CSRF_MARKER`].
///
/// `None` strictly means the marker (or its closing quote) is absent; a
/// present-but-empty token yields `Some("")` so the two cases stay
/// distinguishable.
pub fn find_csrf_token(html: &str) -> Option<String> {
    let start = html.find(CSRF_MARKER)? + CSRF_MARKER.len();
    let rest = &html[start..];
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

/// Hrefs of all student-area course links on the frontpage, in document
/// order.
pub fn course_links(html: &str) -> Vec<String> {
    let anchor = match Selector::parse(r#"a[href^="/student/"]"#) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };
    let document = Html::parse_document(html);
    document
        .select(&anchor)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// One exercise anchor as found on a course page. `name` and `raw_status`
/// are `None` when the expected surrounding markup is missing; the caller
/// decides what to do with such a torso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseEntry {
    pub href: String,
    pub name: Option<String>,
    pub raw_status: Option<String>,
}

/// All exercise anchors on a course page, in document order.
///
/// The display name sits in a `<strong>` inside the row's wide grid column
/// and the status text is the content of the narrow one; those two class
/// lists are the portal's bootstrap layout and the most likely thing to
/// break on a redesign.
pub fn exercise_entries(html: &str) -> Vec<ExerciseEntry> {
    let selectors = (
        Selector::parse(r#"a[href*="/exercise/"]"#),
        Selector::parse("div.col-xs-12.col-sm-6.col-md-8 strong"),
        Selector::parse("div.col-xs-12.col-sm-6.col-md-4"),
    );
    let (anchor, name, status) = match selectors {
        (Ok(anchor), Ok(name), Ok(status)) => (anchor, name, status),
        _ => return Vec::new(),
    };

    let document = Html::parse_document(html);
    document
        .select(&anchor)
        .filter_map(|element| {
            let href = element.value().attr("href")?.to_string();
            Some(ExerciseEntry {
                href,
                name: first_text(element, &name),
                raw_status: first_text(element, &status),
            })
        })
        .collect()
}

fn first_text(element: ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
