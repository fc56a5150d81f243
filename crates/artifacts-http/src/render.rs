//! HTML generation for served pages and the dashboard.

use std::fmt::Write as _;

use artifacts_core::{Page, Tombstone};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

/// Title shown on the dashboard.
pub const DASHBOARD_TITLE: &str = "MCP HTML Artifacts";

/// Shown on the dashboard while no live pages exist.
pub const EMPTY_MESSAGE: &str = "No artifacts yet";

const HIDDEN: &str = r#" style="display:none""#;

/// Reloads the page on `update` and replaces it with a notice on `delete`.
const HOT_RELOAD_SCRIPT: &str = r#"<script>
(() => {
  const source = new EventSource(location.pathname+"/events");
  source.addEventListener("update", () => location.reload());
  source.addEventListener("delete", () => {
    source.close();
    document.body.innerHTML = "<p>This artifact has been deleted.</p>";
  });
})();
</script>"#;

const DASHBOARD_STYLE: &str = "<style>
body { margin: 0; font-family: system-ui, sans-serif; display: flex; flex-direction: column; height: 100vh; }
header { display: flex; align-items: center; gap: 1rem; padding: 0.5rem 1rem; border-bottom: 1px solid #ddd; }
header h1 { font-size: 1.1rem; margin: 0; }
#page-nav { display: flex; gap: 0.5rem; align-items: center; }
#page-frame { flex: 1; border: 0; width: 100%; }
#empty-message { padding: 2rem; color: #666; }
#recently-deleted { padding: 0.5rem 1rem; border-top: 1px solid #ddd; font-size: 0.85rem; color: #666; }
</style>";

const DASHBOARD_SCRIPT: &str = r#"<script>
(() => {
  const select = document.getElementById("page-select");
  const frame = document.getElementById("page-frame");
  const open = document.getElementById("open-link");
  select.addEventListener("change", () => {
    const path = "/pages/" + encodeURIComponent(select.value);
    frame.src = path;
    open.href = path;
  });
  const source = new EventSource("/events");
  source.addEventListener("create", () => location.reload());
  source.addEventListener("delete", () => location.reload());
  source.addEventListener("update", (event) => {
    const page = JSON.parse(event.data);
    for (const option of select.options) {
      if (option.value === page.id) {
        option.textContent = page.name ? page.name + ": " + page.title : page.title;
      }
    }
  });
})();
</script>"#;

/// Render a page with its stylesheets, scripts and the hot-reload script.
///
/// The tags go immediately before the first `</head>`; without one they are
/// prepended to the document.
pub fn page_html(page: &Page) -> String {
    let mut tags: Vec<String> =
        Vec::with_capacity(page.stylesheets.len() + page.scripts.len() + 1);
    for url in &page.stylesheets {
        tags.push(format!(r#"<link rel="stylesheet" href="{}">"#, attr(url)));
    }
    for url in &page.scripts {
        tags.push(format!(r#"<script src="{}"></script>"#, attr(url)));
    }
    tags.push(HOT_RELOAD_SCRIPT.to_string());
    let injection = tags.join("\n");

    match page.html.find("</head>") {
        Some(index) => {
            let (head, rest) = page.html.split_at(index);
            format!("{head}{injection}\n{rest}")
        },
        None => format!("{injection}\n{}", page.html),
    }
}

/// Render the dashboard.
///
/// `pages` may be in any order; the most recently updated page is selected
/// and shown in the frame. Ties go to the page created last.
pub fn dashboard_html(pages: &[Page], tombstones: &[Tombstone]) -> String {
    let mut ordered: Vec<&Page> = pages.iter().rev().collect();
    ordered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    let latest = ordered.first().copied();

    let (nav_style, empty_style) = if latest.is_some() {
        ("", HIDDEN)
    } else {
        (HIDDEN, "")
    };
    let latest_path = latest.map_or_else(String::new, |page| format!("/pages/{}", page.id));

    let mut options = String::new();
    for page in &ordered {
        let selected = if latest.is_some_and(|l| l.id == page.id) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            options,
            r#"<option value="{}"{selected}>{}</option>"#,
            attr(&page.id),
            text(&page.label())
        );
    }

    let mut deleted = String::new();
    for tombstone in tombstones.iter().rev() {
        let _ = writeln!(
            deleted,
            r#"<li>{} <time datetime="{at}">{at}</time></li>"#,
            text(&tombstone.label()),
            at = tombstone.deleted_at.to_rfc3339()
        );
    }
    let deleted_section = if deleted.is_empty() {
        String::new()
    } else {
        format!(
            "<section id=\"recently-deleted\">\n<h2>Recently deleted</h2>\n\
             <ul>\n{deleted}</ul>\n</section>\n"
        )
    };

    let (frame_src, open_href) = if latest.is_some() {
        (attr(&latest_path).into_owned(), attr(&latest_path).into_owned())
    } else {
        ("about:blank".to_string(), "#".to_string())
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{DASHBOARD_TITLE}</title>
{DASHBOARD_STYLE}
</head>
<body>
<header>
<h1>{DASHBOARD_TITLE}</h1>
<nav id="page-nav"{nav_style}>
<select id="page-select">
{options}</select>
<a id="open-link" href="{open_href}" target="_blank">Open</a>
</nav>
</header>
<p id="empty-message"{empty_style}>{EMPTY_MESSAGE}</p>
<iframe id="page-frame" src="{frame_src}"{nav_style}></iframe>
{deleted_section}{DASHBOARD_SCRIPT}
</body>
</html>
"#
    )
}
