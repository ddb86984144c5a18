//! HTML rendering of the separation form

use vsep_common::time::format_timestamp;

use crate::session::{Phase, SessionState, TrackKind, SUPPORTED_EXTENSIONS};

/// Escape text for use in HTML bodies and quoted attributes
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn source_section(state: &SessionState) -> String {
    match state.source() {
        Some(source) => format!(
            r#"<div class="source">Loaded: <strong>{}</strong> ({})</div>"#,
            html_escape(&source.display_name),
            format_timestamp(source.duration_secs)
        ),
        None => String::new(),
    }
}

fn results_section(state: &SessionState) -> String {
    let Some(results) = state.results() else {
        return String::new();
    };

    let players: String = TrackKind::ALL
        .iter()
        .map(|kind| {
            let track = results.track(*kind);
            format!(
                r#"
        <div class="track">
            <h3>{title}</h3>
            <audio controls preload="none" src="/audio/{kind}"></audio>
            <a href="/audio/{kind}?download=1" download="{file}">Download {file}</a>
        </div>"#,
                title = kind.title(),
                kind = kind.as_str(),
                file = html_escape(&track.file_name),
            )
        })
        .collect();

    format!(
        r#"
    <section class="results">
        <h2>Results ({start} - {end})</h2>{players}
    </section>"#,
        start = format_timestamp(results.segment.start),
        end = format_timestamp(results.segment.end),
        players = players,
    )
}

/// Render the full page for a session.
///
/// `notice` is shown above the form, e.g. for a rejected action.
pub fn render(state: &SessionState, notice: Option<&str>) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = env!("GIT_HASH");
    let built = env!("BUILD_TIMESTAMP");

    let accept = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",");

    let end_placeholder = state
        .source()
        .map(|s| format_timestamp(s.duration_secs))
        .unwrap_or_else(|| "end".to_string());
    let start_value = if state.start_text().is_empty() {
        "00:00".to_string()
    } else {
        state.start_text().to_string()
    };

    let status_class = match state.phase() {
        Phase::Error => "status error",
        Phase::Done => "status done",
        _ => "status",
    };

    let error_box = state
        .last_error()
        .map(|msg| format!(r#"<div class="error-box">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();
    let notice_box = notice
        .map(|msg| format!(r#"<div class="notice">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();

    let separate_disabled = if state.separate_enabled() {
        ""
    } else {
        " disabled"
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Vocal / Melody Separator</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            margin: 0;
            padding: 20px;
        }}
        h1 {{ color: #4a9eff; font-size: 26px; }}
        .build-info {{ color: #888; font-family: 'Courier New', monospace; font-size: 12px; }}
        form, .results {{ background-color: #2a2a2a; border: 1px solid #3a3a3a; border-radius: 6px; padding: 16px; margin-bottom: 20px; }}
        label {{ display: block; margin-top: 10px; }}
        input[type=text] {{ width: 100%; max-width: 480px; }}
        .segment input {{ width: 80px; }}
        .status {{ margin: 12px 0; color: #4a9eff; }}
        .status.done {{ color: #4caf50; }}
        .status.error {{ color: #f44336; }}
        .error-box {{ border: 1px solid #f44336; color: #f44336; padding: 8px; margin: 8px 0; }}
        .notice {{ border: 1px solid #ff9800; color: #ff9800; padding: 8px; margin: 8px 0; }}
        button {{ margin-right: 8px; padding: 6px 16px; }}
        .track {{ margin: 12px 0; }}
        .track a {{ color: #4a9eff; margin-left: 12px; }}
    </style>
</head>
<body>
    <h1>Vocal / Melody Separator</h1>
    <div class="build-info">v{version} [{git_hash}] built {built}</div>
    {notice_box}
    <form method="post" action="/" enctype="multipart/form-data">
        <label>Audio file <input type="file" name="file" accept="{accept}"></label>
        <label>or link <input type="text" name="link" value="{link}" placeholder="https://..."></label>
        {source}
        <div class="segment">
            <label>Segment (MM:SS or SS)</label>
            <input type="text" name="start" value="{start}" placeholder="00:00">
            to
            <input type="text" name="end" value="{end}" placeholder="{end_placeholder}">
        </div>
        <div class="{status_class}">Status: {status}</div>
        {error_box}
        <button type="submit" name="action" value="refresh">Load</button>
        <button type="submit" name="action" value="separate"{separate_disabled}>Separate</button>
        <button type="submit" name="action" value="reset">Reset</button>
    </form>{results}
</body>
</html>
"#,
        version = version,
        git_hash = git_hash,
        built = built,
        notice_box = notice_box,
        accept = accept,
        link = html_escape(state.link()),
        source = source_section(state),
        start = html_escape(&start_value),
        end = html_escape(state.end_text()),
        end_placeholder = end_placeholder,
        status_class = status_class,
        status = state.phase().label(),
        error_box = error_box,
        separate_disabled = separate_disabled,
        results = results_section(state),
    )
}
