//! Pure regex evaluation for the live profile preview
//!
//! Both functions are safe to call on every keystroke: they compile the
//! search pattern per call and degrade to returning the sample unchanged
//! when the pattern is empty or does not compile. No error ever escapes
//! this module.

use regex::Regex;

/// Render the sample with every non-overlapping match wrapped in
/// `<mark>`/`</mark>` markers.
///
/// With a valid non-empty pattern the output HTML-escapes all literal text
/// (matched and unmatched alike) so raw input is never reinterpreted as
/// markup; the only injected markup is the highlight markers themselves.
/// With an empty sample, an empty pattern, or a pattern that fails to
/// compile, the sample is returned verbatim.
pub fn highlight_matches(sample: &str, search: &str) -> String {
    if sample.is_empty() || search.is_empty() {
        return sample.to_string();
    }

    let regex = match Regex::new(search) {
        Ok(regex) => regex,
        Err(_) => return sample.to_string(),
    };

    let mut output = String::with_capacity(sample.len() + 32);
    let mut last_end = 0;
    for found in regex.find_iter(sample) {
        escape_html_into(&mut output, &sample[last_end..found.start()]);
        output.push_str("<mark>");
        escape_html_into(&mut output, found.as_str());
        output.push_str("</mark>");
        last_end = found.end();
    }
    escape_html_into(&mut output, &sample[last_end..]);
    output
}

/// Globally replace every match of `search` in `sample` with `replace`.
///
/// Capture group references use the regex crate's standard replacement
/// syntax (`$1`, `${name}`). Empty or invalid patterns return the sample
/// unchanged.
pub fn apply_replace(sample: &str, search: &str, replace: &str) -> String {
    if sample.is_empty() || search.is_empty() {
        return sample.to_string();
    }

    match Regex::new(search) {
        Ok(regex) => regex.replace_all(sample, replace).into_owned(),
        Err(_) => sample.to_string(),
    }
}

fn escape_html_into(output: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }
}
