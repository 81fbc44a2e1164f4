use serde::Serialize;

/// Prints a value to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to serialize output: {error}"))?;

    #[expect(clippy::print_stdout, reason = "command output")]
    {
        println!("{json}");
    }

    Ok(())
}
