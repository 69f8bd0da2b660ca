use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage5Output;

impl Stage5Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Output {
    fn name(&self) -> &'static str {
        "stage5_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, ctx)?;
        }
        if ctx.write_tsv {
            tsv_writer::write_power_tsv(&ctx.output.tsv_path, ctx)?;
        }
        if ctx.write_units_tsv {
            tsv_writer::write_units_tsv(&ctx.output.units_tsv_path, ctx)?;
        }
        info!("outputs_written");
        Ok(())
    }
}
