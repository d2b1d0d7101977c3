//! Schedule commands.

use anyhow::Result;

use datadeck_schedule::{describe, to_local_cron};

pub fn describe_cron(cron: &str) -> Result<()> {
    println!("{}", describe(Some(cron)));
    let local = to_local_cron(cron);
    if !local.is_empty() {
        println!("Local cron: {local}");
    }
    Ok(())
}
