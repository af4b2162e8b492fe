//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - QIR builder, loader and non-adaptive evaluator",
        style("qirk").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qirk-ir    Module model, builder and emitter");
    println!("  qirk-llvm  LLVM IR loader and verifier");
    println!("  qirk-eval  Non-adaptive evaluator");
    println!("  qirk-cli   Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/qirk-dev/qirk").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
