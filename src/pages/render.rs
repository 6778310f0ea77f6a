//! @acp:module "Index Renderer"
//! @acp:summary "Markdown templates for generated index.md files"
//! @acp:domain pages
//! @acp:layer output

use std::fmt::Write;

use super::scan::StanPair;
use crate::config::PagesConfig;

/// Render an index with one Stan Playground embed per program, then file links
pub fn render_playground_index(pairs: &[StanPair], files: &[String], config: &PagesConfig) -> String {
    let mut out = format!("<script src=\"{}\"></script>\n\n", config.embed_script);

    for (i, pair) in pairs.iter().enumerate() {
        let _ = write!(out, "## {}.stan\n\n", pair.stem());
        out.push_str("<stan-playground-embed\n");
        if let Some(ref data) = pair.data {
            let _ = writeln!(out, "    data=\"./{}\"", data);
        }
        let _ = writeln!(out, "    stan=\"./{}\"", pair.stan);
        out.push_str(">\n");
        let _ = writeln!(
            out,
            "<iframe width=\"100%\" height=\"{}\"></iframe>",
            config.iframe_height
        );
        out.push_str("</stan-playground-embed>\n");

        if i + 1 < pairs.len() {
            out.push('\n');
        }
    }

    out.push_str("\n## Files\n\n");
    push_file_links(&mut out, files);
    out
}

/// Render a navigation-only index for a directory without Stan programs
pub fn render_directory_listing(
    name: &str,
    with_stan: &[String],
    other: &[String],
    files: &[String],
) -> String {
    let mut out = format!("# {}\n\n", name);

    push_dir_section(&mut out, "Subdirectories with Stan Files", with_stan);
    push_dir_section(&mut out, "Other Subdirectories", other);

    if !files.is_empty() {
        out.push_str("## Files\n\n");
        push_file_links(&mut out, files);
    }

    out
}

fn push_dir_section(out: &mut String, heading: &str, dirs: &[String]) {
    if dirs.is_empty() {
        return;
    }
    let _ = write!(out, "## {}\n\n", heading);
    for dir in dirs {
        let _ = writeln!(out, "- [{}](./{}/)", dir, dir);
    }
    out.push('\n');
}

fn push_file_links(out: &mut String, files: &[String]) {
    for file in files {
        let _ = writeln!(out, "- [{}](./{})", file, file);
    }
}
