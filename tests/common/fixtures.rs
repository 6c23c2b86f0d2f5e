//! Sample Maestro logs.

pub const INVOKER: &str = "maestro.cli.runner.TestSuiteInteractor";

pub fn line(time: &str, name: &str, state: &str) -> String {
    format!("{time} [ INFO] {INVOKER}: {name} {state}")
}

/// Login flow with one passed and one failed child.
pub fn login_log() -> String {
    [
        "00:00:00.500 [ INFO] maestro.cli.App: Starting Maestro".to_string(),
        line("00:00:01.000", "Login flow", "RUNNING"),
        line("00:00:01.200", "Launch app", "RUNNING"),
        line("00:00:02.500", "Launch app", "COMPLETED"),
        line("00:00:03.000", "Tap on \"Sign in\"", "RUNNING"),
        "java.lang.IllegalStateException: Element not found".to_string(),
        "    at maestro.Orchestra.tap(Orchestra.kt:42)".to_string(),
        line("00:00:04.250", "Tap on \"Sign in\"", "FAILED"),
        line("00:00:04.300", "Login flow", "FAILED"),
        String::new(),
    ]
    .join("\n")
}

/// Everything passes.
pub fn passing_log() -> String {
    [
        line("10:00:00.000", "Launch app", "RUNNING"),
        line("10:00:01.000", "Launch app", "COMPLETED"),
        line("10:00:01.500", "Assert visible \"Home\"", "RUNNING"),
        line("10:00:02.000", "Assert visible \"Home\"", "COMPLETED"),
        String::new(),
    ]
    .join("\n")
}
