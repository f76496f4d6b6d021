use anyhow::Result;

use crate::executor::supported_languages;

pub async fn run() -> Result<()> {
    println!("Registered languages:");
    for info in supported_languages() {
        let status = if info.available {
            "ok"
        } else {
            "interpreter missing"
        };
        println!(
            "  {:<12} {:<12} {:<5} {}",
            info.name, info.key, info.extension, status
        );
    }
    Ok(())
}
