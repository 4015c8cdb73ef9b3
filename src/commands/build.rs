//! `resrun build` — print the generated commands, one per line.

use std::io::Write;

use anyhow::Result;

use crate::builder::Builder;

pub fn run(builder: &Builder) -> Result<()> {
    let stdout = std::io::stdout();
    write_commands(&mut stdout.lock(), &builder.build()?)
}

/// Write `commands` to `out`, newline-terminated.
pub fn write_commands(out: &mut impl Write, commands: &[String]) -> Result<()> {
    for cmd in commands {
        writeln!(out, "{cmd}")?;
    }
    Ok(())
}
