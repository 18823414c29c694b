//! `codejudge rubrics` - list available rubrics

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use codejudge_core::error::Result;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let store = ctx.rubric_store();
    let names = store.list()?;

    match ctx.format() {
        OutputFormat::Json => {
            let rubrics = names
                .iter()
                .map(|name| {
                    let rubric = store.load(name)?;
                    Ok(serde_json::json!({
                        "name": rubric.name,
                        "weight": rubric.weight,
                        "dimensions": rubric.dimension_ids(),
                    }))
                })
                .collect::<Result<Vec<_>>>()?;
            println!("{}", serde_json::to_string_pretty(&rubrics)?);
        }
        OutputFormat::Human => {
            if names.is_empty() && !ctx.cli.quiet {
                println!("No rubrics in {}", store.root().display());
            }
            for name in &names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
