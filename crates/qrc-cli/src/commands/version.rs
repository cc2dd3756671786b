//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum reservoir computing on simulated Rydberg arrays",
        style("QRC").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qrc-reduce  Principal-component projection");
    println!("  qrc-sim     Layouts, Rydberg Hamiltonians, statevector dynamics");
    println!("  qrc         Reservoir, features, readout, persistence");
    println!("  qrc-cli     Command-line interface");
    println!();
    println!("Model schema: {}", style(qrc::SCHEMA_VERSION).dim());
    println!("License:      {}", style("Apache-2.0").dim());
}
