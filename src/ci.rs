//! TeamCity service messages, printed to stdout for the build server to pick up.

/// Escape a value for use inside a `##teamcity[...]` attribute.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            other => out.push(other),
        }
    }
    out
}

pub fn set_parameter_message(name: &str, value: &str) -> String {
    format!(
        "##teamcity[setParameter name='{}' value='{}']",
        escape(name),
        escape(value)
    )
}

pub fn build_status_message(text: &str) -> String {
    format!("##teamcity[buildStatus text='{}']", escape(text))
}

pub fn set_parameter(name: &str, value: &str) {
    println!("{}", set_parameter_message(name, value));
}

pub fn build_status(text: &str) {
    println!("{}", build_status_message(text));
}
