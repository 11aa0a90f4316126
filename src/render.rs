// src/render.rs
// Front page HTML. Hand-written markup; every upstream string goes through html-escape.

use std::fmt::Write as _;
use std::time::Duration;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::cache::Snapshot;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Quiet News</title>
<style>
body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; color: #222; }
li { padding: .25rem 0; }
.host, .meta, footer { color: #888; font-size: .85rem; }
</style>
</head>
<body>
<h1>Quiet News</h1>
"#;

/// Render the front page for `snap`. `elapsed` is how long the request has taken so far.
pub fn page(snap: &Snapshot, elapsed: Duration) -> String {
    let mut out = String::with_capacity(HEAD.len() + snap.len() * 256);
    out.push_str(HEAD);

    if snap.is_empty() {
        out.push_str("<p>No stories yet. Check back in a moment.</p>\n");
    } else {
        out.push_str("<ol>\n");
        for s in &snap.stories {
            let _ = write!(
                out,
                "<li><a href=\"{}\">{}</a>",
                encode_double_quoted_attribute(&s.item.url),
                encode_text(&s.item.title)
            );
            if !s.host.is_empty() {
                let _ = write!(out, " <span class=\"host\">({})</span>", encode_text(&s.host));
            }
            let _ = writeln!(
                out,
                "<br><span class=\"meta\">{} points by {}</span></li>",
                s.item.score,
                encode_text(&s.item.by)
            );
        }
        out.push_str("</ol>\n");
    }

    out.push_str("<footer>");
    if let Some(ts) = snap.built_at {
        let _ = write!(out, "Updated {} &middot; ", ts.format("%Y-%m-%d %H:%M UTC"));
    }
    let _ = write!(out, "This page was rendered in {elapsed:?}");
    out.push_str("</footer>\n</body>\n</html>\n");
    out
}
