use std::io::Write;

use anyhow::Result;

use crate::cmd::write_pretty;

pub fn run(out: &mut dyn Write) -> Result<()> {
    write_pretty(out, &field_sync::wire_schema())
}
