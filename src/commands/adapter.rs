use crate::adapters::{AdapterKind, builtins};

/// Prints every built-in adapter and whether its command is installed
pub fn list_adapters() {
    for (kind, title) in [(AdapterKind::Editor, "Editors"), (AdapterKind::Ai, "AI tools")] {
        println!("{}:", title);
        for adapter in builtins(kind) {
            let mark = if adapter.is_available() { "✓" } else { "✗" };
            println!(
                "  {} {:<12} {:<14} {}",
                mark, adapter.name, adapter.command, adapter.description
            );
        }
        println!();
    }
    println!("Any other command on PATH can be used as a generic adapter.");
}
