use sanitize_html::errors::SanitizeError;
use sanitize_html::rules::Rules;
use sanitize_html::sanitize_str;

/// Rules that keep text only. Unknown tags are unwrapped, these are
/// dropped together with everything inside them.
pub fn get_plain_text_rules() -> Rules {
    Rules::new()
        .allow_comments(false)
        .delete("style").delete("script").delete("object").delete("head").delete("link")
        .delete("iframe").delete("applet").delete("embed").delete("meta")
        .delete("noscript").delete("template")
}

pub fn clean_html(input: &str, rules: &Rules) -> Result<String, SanitizeError> {
    sanitize_str(rules, input)
}
