use crate::error::Result;
use abmeta::engine::plugins::builtin_plugins;

pub fn run() -> Result<()> {
    println!("{:<20} {:<10} {}", "NAME", "PREFIX", "TABLE");
    for plugin in builtin_plugins() {
        println!(
            "{:<20} {:<10} {}",
            plugin.name(),
            plugin.prefix(),
            plugin.table()
        );
    }
    Ok(())
}
