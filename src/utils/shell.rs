use std::ffi::OsStr;

/// Renders a program and its arguments as a single line for log messages.
///
/// Arguments are joined with spaces as-is; nothing is quoted or escaped.
pub fn render_command<I, S>(program: impl AsRef<OsStr>, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut line = program.as_ref().to_string_lossy().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}
