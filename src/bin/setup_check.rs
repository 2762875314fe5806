use std::process::ExitCode;

use consilience_server::config::{SettingStatus, SetupReport};

fn main() -> ExitCode {
    let report = SetupReport::from_env();

    for check in &report.checks {
        let line = match &check.status {
            SettingStatus::Configured(value) => format!("ok       {} ({value})", check.name),
            SettingStatus::Invalid(hint) => format!("invalid  {} ({hint})", check.name),
            SettingStatus::Missing if check.required => format!("missing  {}", check.name),
            SettingStatus::Missing => format!("optional {} not set", check.name),
        };
        println!("{line}");
    }

    println!(
        "{}/{} settings configured",
        report.configured_count(),
        report.checks.len()
    );
    if report.is_ready() {
        println!("Ready to start the server");
        ExitCode::SUCCESS
    } else {
        println!("Fix the settings above, then run this check again");
        ExitCode::FAILURE
    }
}
